//! Topic pools and random topic selection.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const GENERATIVE_AI_TOPICS: [&str; 20] = [
    "Large Language Models (LLMs) and their latest developments",
    "Retrieval-Augmented Generation (RAG) systems and applications",
    "AI Agents and autonomous systems",
    "Multi-modal AI models combining text, image, and audio",
    "AI-powered chatbots and conversational interfaces",
    "AI image generation and computer vision breakthroughs",
    "AI video generation and synthetic media",
    "AI audio and music generation technologies",
    "AI code generation and programming assistants",
    "Prompt engineering and optimization techniques",
    "Fine-tuning and customization of AI models",
    "AI safety and alignment research",
    "Edge AI and on-device machine learning",
    "AI in creative industries and content creation",
    "Generative AI ethics and responsible AI development",
    "AI model compression and efficiency improvements",
    "Open-source vs proprietary AI models comparison",
    "AI-powered automation tools and workflows",
    "Generative AI in healthcare and medical applications",
    "AI in education and personalized learning systems",
];

pub const BLOCKCHAIN_TOPICS: [&str; 20] = [
    "Decentralized Finance (DeFi) protocols and lending markets",
    "Non-Fungible Tokens (NFTs) beyond digital art",
    "Ethereum scaling with layer-2 rollups",
    "Bitcoin adoption by institutions and nation states",
    "Smart contract security and auditing practices",
    "Central Bank Digital Currencies (CBDCs) around the world",
    "Decentralized Autonomous Organizations (DAOs) and on-chain governance",
    "Web3 identity and self-sovereign credentials",
    "Tokenization of real-world assets on the blockchain",
    "Blockchain consensus mechanisms: proof of stake vs proof of work",
    "Crypto regulation and compliance frameworks",
    "Cross-chain bridges and blockchain interoperability",
    "Stablecoins and the future of crypto payments",
    "Blockchain in supply chain transparency",
    "Zero-knowledge proofs in blockchain privacy",
    "Crypto wallet security and self-custody",
    "Decentralized storage networks and Web3 infrastructure",
    "Blockchain gaming and play-to-earn economies",
    "Bitcoin mining, energy use, and sustainability",
    "Enterprise blockchain platforms and permissioned ledgers",
];

/// Keywords that mark a topic as blockchain-themed.
pub const BLOCKCHAIN_KEYWORDS: [&str; 12] = [
    "blockchain",
    "bitcoin",
    "crypto",
    "defi",
    "nft",
    "ethereum",
    "dao",
    "web3",
    "smart contract",
    "decentralized",
    "cbdc",
    "tokeniz",
];

/// Content category selecting the topic pool and agent framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    GenAI,
    Blockchain,
}

impl Theme {
    /// Topic pool for this theme.
    pub fn topics(self) -> &'static [&'static str] {
        match self {
            Theme::GenAI => &GENERATIVE_AI_TOPICS,
            Theme::Blockchain => &BLOCKCHAIN_TOPICS,
        }
    }

    /// Human-readable subject used when framing prompts.
    pub fn subject(self) -> &'static str {
        match self {
            Theme::GenAI => "generative AI",
            Theme::Blockchain => "blockchain and Web3",
        }
    }

    /// Classify a free-form topic by blockchain keywords.
    pub fn infer(topic: &str) -> Self {
        let lowered = topic.to_lowercase();
        if BLOCKCHAIN_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            Theme::Blockchain
        } else {
            Theme::GenAI
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::GenAI => write!(f, "genai"),
            Theme::Blockchain => write!(f, "blockchain"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "genai" => Ok(Theme::GenAI),
            "blockchain" => Ok(Theme::Blockchain),
            other => Err(format!("unknown theme '{}', expected genai or blockchain", other)),
        }
    }
}

/// A resolved subject together with the theme that frames it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedTopic {
    pub theme: Theme,
    pub topic: String,
}

/// Picks a base topic and appends a trending angle.
#[derive(Debug, Clone, Copy)]
pub struct TopicSelector {
    year: i32,
}

impl TopicSelector {
    /// Selector whose "in {year}" angle uses the given year.
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    /// Selector for the current UTC year.
    pub fn current() -> Self {
        use chrono::Datelike;
        Self::new(chrono::Utc::now().year())
    }

    fn angles(&self) -> [String; 6] {
        [
            format!("in {}", self.year),
            "latest trends and innovations".to_string(),
            "breaking developments".to_string(),
            "industry impact and future prospects".to_string(),
            "practical applications and use cases".to_string(),
            "challenges and opportunities ahead".to_string(),
        ]
    }

    /// Pick a topic.
    ///
    /// With a theme the pick is uniform within that pool. Without one it is
    /// uniform over both pools concatenated, so the larger pool is favoured.
    pub fn select<R: Rng + ?Sized>(&self, theme: Option<Theme>, rng: &mut R) -> SelectedTopic {
        let (theme, base) = match theme {
            Some(theme) => {
                let pool = theme.topics();
                (theme, pool[rng.gen_range(0..pool.len())])
            }
            None => {
                let ai = Theme::GenAI.topics();
                let chain = Theme::Blockchain.topics();
                let index = rng.gen_range(0..ai.len() + chain.len());
                if index < ai.len() {
                    (Theme::GenAI, ai[index])
                } else {
                    (Theme::Blockchain, chain[index - ai.len()])
                }
            }
        };

        let angles = self.angles();
        let angle = &angles[rng.gen_range(0..angles.len())];

        SelectedTopic {
            theme,
            topic: format!("{} - {}", base, angle),
        }
    }
}

//! Role prompts for the research, writing and editing agents.

use crate::domains::generation::topics::Theme;
use crate::kernel::SearchResult;

pub fn researcher_system(theme: Theme) -> String {
    let focus = match theme {
        Theme::GenAI => {
            "You track developments in artificial intelligence, with a focus on \
             generative AI technologies, research breakthroughs, industry applications \
             and market trends."
        }
        Theme::Blockchain => {
            "You track developments in blockchain, cryptocurrencies, DeFi, NFTs, Web3, \
             CBDCs and distributed ledger technologies, along with regulation and \
             enterprise adoption."
        }
    };

    format!(
        "You are a research specialist. {} You find the most relevant and recent \
         information and summarize it clearly.",
        focus
    )
}

pub fn researcher_task(topic: &str, theme: Theme, sources: &[SearchResult]) -> String {
    let mut prompt = format!(
        "Research the latest developments in {} related to: {}\n\n\
         Focus on:\n\
         1. Recent breakthroughs and innovations\n\
         2. Industry applications and use cases\n\
         3. Market trends and adoption\n\
         4. Expert opinions and predictions\n\
         5. Challenges and opportunities\n\n\
         Provide a 200-300 word summary with key facts, statistics and insights.",
        theme.subject(),
        topic
    );

    if !sources.is_empty() {
        prompt.push_str("\n\nRecent search results:\n");
        for source in sources {
            prompt.push_str(&format!("- {} ({})", source.title, source.url));
            if let Some(date) = &source.date {
                prompt.push_str(&format!(" [{}]", date));
            }
            prompt.push_str(&format!("\n  {}\n", source.snippet));
        }
    }

    prompt
}

pub fn writer_system(theme: Theme) -> String {
    format!(
        "You are a senior technology writer covering {}. You turn complex research \
         into engaging, accessible articles for a broad audience.",
        theme.subject()
    )
}

pub fn writer_task(topic: &str, research: &str) -> String {
    format!(
        "Using the research summary below, write a blog post about: {}\n\n\
         Research summary:\n{}\n\n\
         Requirements:\n\
         - 800-1200 words\n\
         - Start with a single top-level heading: # Title\n\
         - Organize the body with ## and ### section headings\n\
         - Open with a hook and close with a forward-looking conclusion\n\
         - End with a line of the form: **Tags:** tag1, tag2, tag3 (5-7 relevant tags)",
        topic, research
    )
}

pub const EDITOR_SYSTEM: &str = "You are a content editor and SEO specialist. You polish \
    drafts for clarity, flow and accuracy without changing their structure.";

pub fn editor_task(draft: &str) -> String {
    format!(
        "Edit the blog post below. Fix grammar and flow, keep the markdown headings and \
         the **Tags:** line, and return the full post.\n\n\
         After the post, add one line of the form:\n\
         Meta Description: <150-160 character summary>\n\n\
         Draft:\n{}",
        draft
    )
}

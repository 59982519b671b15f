//! Prompt construction and response parsing for the model calls.

use once_cell::sync::Lazy;
use regex::Regex;

/// Score reported when the model's answer holds no usable number.
pub const FALLBACK_SCORE: f64 = 5.0;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("Failed to create number regex"));

/// Prompt asking for a summary of `text`.
pub fn summary_prompt(text: &str) -> String {
    format!("Summarize the following PDF content:\n\n{}", text)
}

/// Prompt asking for a bare 0-10 genuineness score of `text`.
pub fn score_prompt(text: &str) -> String {
    format!(
        "Analyze the following document and give a score between 0 and 10 for how genuine it seems.\n\
         Consider whether it's a proper invoice, has dates, formatting, signatures, or official tone.\n\
         Output ONLY the score:\n\n{}",
        text
    )
}

/// First number in the model's answer, if it lies in `[0, 10]`; otherwise 5.0.
pub fn parse_score(response: &str) -> f64 {
    NUMBER
        .find(response)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|score| (0.0..=10.0).contains(score))
        .unwrap_or(FALLBACK_SCORE)
}

/// Chat prompt grounding the user's question in the knowledge base.
pub fn chat_prompt(knowledge_context: &str, user_prompt: &str) -> String {
    format!(
        r#"
You are a helpful AI assistant for a decentralized Web3 application.

The platform includes smart contracts for:
- Fundraising (FundraiserDApp)
- Remittance (secure peer-to-peer transfers)
- Lending pools using a ROSCA model (MultiPoolLoanSystem)

Below is the complete knowledge base of the system contracts:

{knowledge_context}

IMPORTANT FORMATTING RULES:
- Use ONLY plain text in your response
- Do NOT use any markdown formatting like bold, italic, or code
- Do NOT use asterisks, quotes, backticks, or other special characters for formatting
- Use simple numbered lists like: 1. First item, 2. Second item
- Use simple bullet points with dashes: - Item one, - Item two
- Keep responses clean and readable without any markup

Now, answer the following user query with accurate, simple, and clear instructions in plain text only.
Be helpful and provide specific details from the knowledge base when relevant.
If the user asks about functions, explain how to use them.
If they ask about workflows, walk them through the steps.
Keep your responses concise but informative.

User: {user_prompt}
"#
    )
}

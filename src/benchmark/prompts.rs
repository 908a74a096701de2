//! Prompt sets
//!
//! Fixed prompts for the benchmark run and example prompts for the demo.

/// Benchmark prompts, run in this order
pub const DEMO_PROMPTS: &[&str] = &[
    "Summarize the key benefits of cloud migration for enterprise companies in 3 bullet points.",
    "Write a professional email declining a meeting request due to scheduling conflicts.",
    "Explain our data privacy policy regarding customer information in simple terms that anyone can understand.",
    "What are the main differences between agile and waterfall project management methodologies?",
    "Draft a 2-sentence product announcement for our new AI-powered analytics platform.",
    "List 3 key performance indicators for measuring customer satisfaction in SaaS businesses.",
    "Describe the advantages of microservices architecture over monolithic architecture.",
    "Write a brief response to a customer asking about our return policy for enterprise software licenses.",
];

/// Example prompts offered in the demo UI
pub const ENTERPRISE_EXAMPLES: &[&str] = &[
    "Summarize the key benefits of adopting AI in customer service operations.",
    "Write a professional email response to a client requesting a project timeline extension.",
    "Explain the concept of technical debt to non-technical stakeholders in simple terms.",
    "List 5 best practices for ensuring data security in cloud-based applications.",
    "Draft a brief announcement about our new product feature launch for internal communication.",
];

/// Prompt used by the stand-alone generator smoke test
pub const SMOKE_TEST_PROMPT: &str = "Explain quantum computing in 2 sentences.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_sets_are_non_empty() {
        assert_eq!(DEMO_PROMPTS.len(), 8);
        assert_eq!(ENTERPRISE_EXAMPLES.len(), 5);
        assert!(DEMO_PROMPTS.iter().all(|p| !p.trim().is_empty()));
        assert!(ENTERPRISE_EXAMPLES.iter().all(|p| !p.trim().is_empty()));
    }
}

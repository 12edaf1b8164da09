/*!
 * Tests for token counting
 */

use anyhow::Result;
use summasub::token_counter::{HeuristicTokenCounter, TiktokenCounter, TokenCounter};

#[test]
fn test_tiktoken_withLongerText_shouldCostMore() -> Result<()> {
    let counter = TiktokenCounter::for_model("gpt-3.5-turbo")?;

    let short = counter.count_tokens("Hello.");
    let long = counter.count_tokens("Hello. This subtitle line goes on for quite a bit longer than the first.");

    assert!(short >= 1);
    assert!(long > short);
    Ok(())
}

#[test]
fn test_tiktoken_withCjkText_shouldCountTokens() -> Result<()> {
    let counter = TiktokenCounter::for_model("gpt-4")?;
    assert!(counter.count_tokens("債券在經濟衰退時的防禦特性") > 0);
    Ok(())
}

#[test]
fn test_counters_asTraitObjects_shouldBeInterchangeable() -> Result<()> {
    let counters: Vec<Box<dyn TokenCounter>> = vec![
        Box::new(TiktokenCounter::for_model("gpt-3.5-turbo")?),
        Box::new(HeuristicTokenCounter),
        Box::new(|text: &str| text.chars().count()),
    ];

    for counter in &counters {
        assert_eq!(counter.count_tokens(""), 0);
        assert!(counter.count_tokens("some subtitle text") > 0);
    }
    Ok(())
}

#[test]
fn test_heuristic_withFourBytesPerToken_shouldRoundDown() {
    assert_eq!(HeuristicTokenCounter.count_tokens("abcdefgh"), 2);
    assert_eq!(HeuristicTokenCounter.count_tokens("abcdefghi"), 2);
}

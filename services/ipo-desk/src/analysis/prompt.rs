//! Prompt sent to the summarizer.

pub const DATA_START: &str = "--- IPO DATA START ---";
pub const DATA_END: &str = "--- IPO DATA END ---";

/// Required opening of the Final Verdict section.
pub const VERDICT_OPENING: &str = "Based on the available data...";

const INSTRUCTIONS: &str = "You are an expert IPO analyst with immense stock market knowledge, providing a summary for a retail investor. Based ONLY on the text provided below, generate a comprehensive analysis of the IPO. Structure your response as follows:
1.  **IPO Snapshot:** Briefly list the Issue Size, Price Band, and Dates.
2.  **Business Overview:** A one or two-sentence summary of what the company does.
3.  **Financial Health:** Briefly comment on the company's financial performance (revenue/profit trends) based on the data.
4.  **Positive Indicators (Reasons to consider applying):** Create a bulleted list of positive points.
5.  **Negative Indicators (Reasons for caution):** Create a bulleted list of negative points.
6.  **Final Verdict:** Conclude with a balanced, one-paragraph verdict based *strictly* on the provided information. Start with \"";

/// Build the analysis prompt around the aggregated detail-page text.
///
/// The text is embedded verbatim between the data markers.
pub fn build_prompt(aggregated: &str) -> String {
    format!("{INSTRUCTIONS}{VERDICT_OPENING}\".\n\n{DATA_START}\n{aggregated}\n{DATA_END}\n")
}

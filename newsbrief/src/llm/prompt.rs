//! Prompt construction for three-line article summaries.

/// Build the instruction block sent to the model.
///
/// Pure and deterministic: the same inputs always produce the same text.
/// Field values are whitespace-normalized; absent or blank fields are left
/// empty rather than omitted so the layout never shifts. `body` is appended
/// only when non-blank.
pub fn build_prompt(title: &str, description: Option<&str>, url: Option<&str>, body: Option<&str>) -> String {
    let mut prompt = String::from(
        "Summarize the news article below in exactly 3 lines.\n\
         - Write in the same language as the article.\n\
         - Each line states one core fact in a single sentence.\n\
         - Keep numbers, dates and proper nouns exactly as written.\n\
         - Do not speculate, exaggerate or add information that is not in the article.\n\
         - Output only the 3 lines, with no heading or numbering.\n\n\
         Article:\n",
    );

    prompt.push_str(&format!("Title: {}\n", squash(title)));
    prompt.push_str(&format!("Description: {}\n", squash(description.unwrap_or(""))));
    prompt.push_str(&format!("Link: {}\n", squash(url.unwrap_or(""))));

    if let Some(body) = body.map(squash).filter(|b| !b.is_empty()) {
        prompt.push_str(&format!("Body:\n{}\n", body));
    }

    prompt
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

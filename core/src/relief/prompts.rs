pub fn extraction_prompt(raw_text: &str) -> String {
    format!(
        r#"You are a disaster relief coordinator AI. Analyze the following unstructured text which contains various mixed requests (rescue, medical, food, shelter, etc.).

Task:
1. Identify ONLY requests strictly related to FOOD, WATER, RATIONS, or BABY FORMULA.
2. Ignore requests that are purely for boat rescue or medical aid unless food is also explicitly mentioned.
3. Extract structured data for each request.
4. Estimate the urgency based on keywords (e.g., "starving", "no water for 2 days" = Critical).
5. If the requester name or location is missing, put "Unknown". Omit contactNumber when no phone number is given.
6. Estimate peopleCount from the text; use 1 when no count is given.

Input Text:
{text}"#,
        text = raw_text
    )
}

pub fn web_search_query(source: &str) -> String {
    format!(
        r#"Search for the latest urgent food, water, and relief supply requests listed on '{source}'.
Also find recent social media posts and news reports describing specific people or communities stranded without food in the current flood affected regions.
Compile a detailed textual list of these requests, including location, contact numbers (if any), specific needs, and number of people."#,
        source = source
    )
}

/// Header marking digest text as web-search-derived before it is extracted.
pub fn web_provenance_header(source: &str) -> String {
    format!("[SOURCE: Web Search results for {} and related feeds]", source)
}

pub fn with_web_provenance(source: &str, digest: &str) -> String {
    format!("{}\n\n{}", web_provenance_header(source), digest)
}

use serde_json::json;

pub const KEY_CHECK_PROMPT: &str = "Reply with three silly words to prove you are alive.";

/// Instruction for handwritten connection permits. `address_suffix` is
/// appended by the model to every address it reads.
pub fn permit_prompt(address_suffix: &str) -> String {
    format!(
        "You are an expert OCR assistant trained specifically to interpret handwritten water/sewer connection permits.
You will be given an image of a permit filled out by applicants.
Your task is to extract handwritten entries from known labeled sections of the form, which may vary slightly in position across permits.
Each field is identified by printed text followed by a handwritten response on or near an underlined blank.
When given an image, extract and return ONLY a JSON object with the following keys and rules (do not include any explanation or extra text):
  - address: The handwritten address next to 'Location of Installation'. Append '{suffix}' to the result.
  - date: The handwritten date next to the top-left 'Date:' label. Format it as MM-DD-YYYY.
  - size: The first part of the handwritten value next to 'Size and Type of Service Line'. Convert to decimal inches (e.g., 3/4\" becomes 0.75, 1 1/2 becomes 1.5).
  - material: The second part of the same field after the size. Interpret 'K' as 'copper', 'PVC' or 'poly' as 'PVC'. If no material is written, return null.
  - notes: Capture any additional handwritten information near that section that does not belong to the other fields (such as 'behind curb' or hydrant direction), or return null if there are no notes.
Assume handwriting may vary and values may be slightly misaligned. Only extract the fields listed above and return valid JSON.",
        suffix = address_suffix.trim()
    )
}

/// Instruction for civil engineering project record sheets.
pub fn project_prompt() -> String {
    "You are an expert at reading civil engineering project record drawings and as-built PDFs.
Extract the following fields and return them as JSON:
  - project_name: the main title of the project or document.
  - project_number: the project or job number, or null if none is shown.
  - date: the date of the project or the date shown on the document, formatted MM-DD-YYYY.
  - notes: any short remarks that help locate the work, or null.
  - parts: every distinct segment of work. For work along a street between two cross streets or addresses, give start and finish as geocodable place descriptions (for example 'Main St & 5th St'). For work at a single location, give only start.
Return only the relevant information."
        .to_string()
}

/// `responseSchema` constraining project answers.
pub fn project_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "project_name": { "type": "STRING" },
            "project_number": { "type": "STRING", "nullable": true },
            "date": { "type": "STRING", "nullable": true },
            "notes": { "type": "STRING", "nullable": true },
            "parts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "start": { "type": "STRING" },
                        "finish": { "type": "STRING", "nullable": true }
                    },
                    "required": ["start"]
                }
            }
        },
        "required": ["project_name", "parts"]
    })
}

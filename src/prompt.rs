// ABOUTME: Prompt construction for the impact-slides application
// ABOUTME: Builds the text and image prompts plus the JSON response schema

use crate::models::{ContentRequest, ContentType};
use serde_json::{json, Value};

/// System instruction sent with every text request.
pub const SYSTEM_INSTRUCTION: &str = "You are a specialized content generator for an English Education brand. Your output is always valid JSON.";

/// Build the text-generation prompt for a request.
pub fn text_prompt(request: &ContentRequest) -> String {
    let count = request.effective_slide_count();
    let topic = &request.topic;

    let context = match request.content_type {
        ContentType::Grammar => format!(
            "Create {count} slides about Grammar focused on: \"{topic}\". Provide 2-3 correct sentence examples and a brief explanation of the rule."
        ),
        ContentType::Vocabulary => format!(
            "Create {count} slides teaching Vocabulary about: \"{topic}\". Each slide should have a new word/phrase and its Indonesian translation."
        ),
        ContentType::Slang => format!(
            "Create {count} slides about English Slang Words regarding: \"{topic}\". Include the slang, an example sentence, and Indonesian meaning."
        ),
        ContentType::Idioms => format!(
            "Create {count} slides about English Idioms regarding: \"{topic}\". Include the idiom, usage example, and Indonesian meaning."
        ),
        ContentType::Announcement => announcement_context(request),
    };

    format!(
        "You are an expert English teacher for \"Impact\", an English course.\n\
         {context}\n\n\
         Ensure the tone is modern, educational, and fun.\n\
         Generate a strictly JSON array of objects."
    )
}

fn announcement_context(request: &ContentRequest) -> String {
    // Serialising a Vec<String> cannot fail
    let highlights =
        serde_json::to_string(&request.highlights()).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Create 1 slide for an Announcement.\n\
         Title: \"{title}\"\n\
         Main Message: \"{body1}\"\n\
         Highlights/Fields: {highlights}\n\
         Additional Details: \"{body2}\"\n\n\
         Instructions:\n\
         1. Use the provided Title as the slide title.\n\
         2. Use the Main Message as the 'mainText'. Do NOT include the highlights here.\n\
         3. STRICTLY put the items from 'Highlights/Fields' into the 'contentList' array. Keep them exactly as provided or slightly formatted for clarity.\n\
         4. Use Additional Details as the 'secondaryText' (if empty, leave empty).\n\
         5. Generate a 'visualPrompt' describing a professional, modern, flat vector illustration suitable for this announcement (e.g., megaphone, calendar, notification bell).",
        title = request.announcement_title,
        body1 = request.announcement_body1,
        body2 = request.announcement_body2,
    )
}

/// Prompt handed to the image model for one slide.
pub fn image_prompt(visual_prompt: &str) -> String {
    format!(
        "A clean, modern flat vector or cartoon style illustration. {}. White or soft colored solid background. High quality, educational context. Do not include text in the image.",
        visual_prompt.trim()
    )
}

/// Output-shape contract for the text model: an array of slide objects.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "Catchy title for the slide"
                },
                "mainText": {
                    "type": "STRING",
                    "description": "The core educational content (examples, words, etc.) or the Main Message for announcements."
                },
                "contentList": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of strings. Use this for specific announcement fields (e.g. Time, Date, Location) or bullet points. Do NOT put these in mainText."
                },
                "secondaryText": {
                    "type": "STRING",
                    "description": "Translations, explanations, or meanings. For announcements, this is the Additional Details."
                },
                "visualPrompt": {
                    "type": "STRING",
                    "description": "A detailed description for an AI image generator to create a vector/cartoon style illustration representing this content. Minimalist background."
                }
            },
            "required": ["title", "mainText", "visualPrompt"]
        }
    })
}

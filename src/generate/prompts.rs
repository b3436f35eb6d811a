/// Prompt asking for an English translation of a transcript
pub fn translation_prompt(source_language: &str, transcript: &str) -> String {
    format!(
        "Please translate the following transcript from {source_language} to English.\n\
         Preserve the meaning and maintain natural language flow.\n\
         \n\
         Transcript:\n\
         {transcript}\n\
         \n\
         Please provide only the English translation, no additional text.\n"
    )
}

/// Prompt asking for notes and a summary, sectioned with `NOTES:` and `SUMMARY:`
pub fn notes_prompt(transcript: &str) -> String {
    format!(
        "Based on the following transcript from a YouTube video, please create comprehensive notes and a summary.\n\
         \n\
         First, create detailed notes that:\n\
         1. Extract key concepts and main ideas\n\
         2. Organize information into logical sections\n\
         3. Include important definitions or explanations\n\
         4. List any significant examples or case studies mentioned\n\
         5. Note any actionable tips or recommendations\n\
         \n\
         Then, provide a concise summary of the video.\n\
         \n\
         Here's the transcript:\n\
         \n\
         {transcript}\n\
         \n\
         Please format your response as follows:\n\
         NOTES:\n\
         [Detailed notes here]\n\
         \n\
         SUMMARY:\n\
         [Concise summary here]\n"
    )
}

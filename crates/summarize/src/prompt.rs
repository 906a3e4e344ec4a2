use crate::schema::Category;

fn task_description(category: Category) -> &'static str {
    match category {
        Category::ReadingMaterials => {
            "Task: Generate a concise introduction and a concise conclusion from the document.\n\
             Steps:\n\
             1. Read the document content between triple quotes.\n\
             2. For the **Introduction**, summarize the document's background, context, and objectives.\n\
             3. For the **Conclusion**, summarize the final insights or recommendations presented.\n\
             4. Output the result in the following format:\n   \
             **Introduction**: <Your generated introduction>\n   \
             (Leave one blank line)\n   \
             **Conclusion**: <Your generated conclusion>\n\
             5. Verify that both sections are present, distinct, and clear."
        }
        Category::Homework => {
            "Task: Extract key points and generate ideas from the homework document.\n\
             Steps:\n\
             1. Read the document content between triple quotes.\n\
             2. Identify the main key points from the document.\n\
             3. Generate additional ideas or suggestions relevant to the assignment.\n\
             4. Output the result in the following format:\n   \
             **Key Points**: <List the key points>\n   \
             (Leave one blank line)\n   \
             **Ideas**: <Further ideas or suggestions>\n\
             5. Ensure the output is structured, clear, and meets the requirements."
        }
    }
}

/// Prompt for summarizing a whole document or one chunk of it.
pub fn build_summary_prompt(category: Category, course_name: &str, content: &str) -> String {
    format!(
        "You are an AI study assistant for the course '{}'.\n\n\
         {}\n\n\
         Document Content:\n\"\"\"\n{}\n\"\"\"\n\n\
         Please analyze the document and provide the output in the exact format specified above. \
         Make sure to follow each step, verify conditions, and only output the final result once all checks are passed.",
        course_name,
        task_description(category),
        content
    )
}

/// Prompt merging per-chunk summaries into one structured output.
pub fn build_combination_prompt(course_name: &str, chunk_summaries: &[String]) -> String {
    format!(
        "You are an AI study assistant for the course '{}'.\n\n\
         Task: Combine the following chunk summaries into one final, coherent output that includes all required details.\n\
         Chunk Summaries:\n\"\"\"\n{}\n\"\"\"\n\n\
         Output the final result in the same structured format as specified above.",
        course_name,
        chunk_summaries.join("\n")
    )
}

pub fn build_followup_prompt(context: &str, course_name: &str) -> String {
    format!(
        "You are an AI study assistant for the course '{}'.\n\
         You have previously provided a summary of the document and answered some follow-up questions.\n\
         Here is the conversation context:\n\"\"\"\n{}\n\"\"\"\n\
         Now, please answer the new question in a clear, concise, and informative manner.",
        course_name, context
    )
}

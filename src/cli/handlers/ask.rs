//! Question answering handlers: one-shot `ask` and the interactive `chat` loop

use std::io;

use crate::cli::output::print_answer;
use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_prompt;
use crate::cli::output::print_sources;
use crate::cli::output::print_success;
use crate::rag::RagQuery;
use crate::rag::RagService;
use crate::AppConfig;
use crate::Result;

fn build_query(question: &str, user_id: &str, doc: Option<&str>, k: Option<usize>) -> RagQuery {
    let mut query = RagQuery::new(question, user_id);
    if let Some(doc) = doc {
        query = query.with_doc(doc);
    }
    query.top_k = k;
    query
}

/// Answer one question over a user's documents
pub async fn handle_ask_command(
    config: &AppConfig,
    question: &str,
    user_id: &str,
    doc: Option<&str>,
    k: Option<usize>,
    show_sources: bool,
) -> Result<()> {
    println!("🤖 DocQA");
    println!("========\n");
    println!("Question: {question}");
    if let Some(doc) = doc {
        println!("Document: {doc}");
    }

    println!("\n⏳ Initializing RAG service...");
    let rag_service = RagService::new(config).await?;

    println!("🔍 Retrieving and generating...");
    let response = rag_service
        .answer(build_query(question, user_id, doc, k))
        .await?;

    print_answer(&response.answer, response.cached);
    if show_sources {
        if !response.sources.is_empty() {
            print_sources(&response.sources);
        }
    } else {
        println!("\n💡 Use --show-sources to see the chunks behind this answer");
    }

    Ok(())
}

/// Interactive loop; a failed question is reported and the loop keeps going
pub async fn handle_chat_command(
    config: &AppConfig,
    user_id: &str,
    doc: Option<&str>,
) -> Result<()> {
    let rag_service = RagService::new(config).await?;

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║  💬 Interactive Chat Mode                                      ║");
    println!("║  Commands: 'exit', 'quit', 'sources' (last answer), Ctrl+C     ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();
    match doc {
        Some(doc) => print_info(&format!("Asking about '{doc}' for user {user_id}")),
        None => print_info(&format!("Asking across all documents of user {user_id}")),
    }
    println!();

    let mut last_sources = Vec::new();

    loop {
        print_prompt("You: ")?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }
        let question = input.trim();

        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }
        if question.eq_ignore_ascii_case("sources") {
            if last_sources.is_empty() {
                print_info("No sources yet");
            } else {
                print_sources(&last_sources);
            }
            println!();
            continue;
        }

        match rag_service
            .answer(build_query(question, user_id, doc, None))
            .await
        {
            Ok(response) => {
                print_answer(&response.answer, response.cached);
                last_sources = response.sources;
            }
            Err(e) => print_error(&e.to_string()),
        }
        println!();
    }

    print_success("👋 Conversation ended. Goodbye!");
    Ok(())
}

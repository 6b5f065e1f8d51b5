use std::sync::Arc;

use story_canvas::api_server;
use story_canvas::config::Config;
use story_canvas::llm_gateway::OpenAIClient;
use story_canvas::pipeline;
use story_canvas::stories::StoryRegistry;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("Usage: story_canvas <command>");
    println!();
    println!("Commands:");
    println!("  evaluate <image> <story text...>        - Evaluate a drawing against a story");
    println!("  evaluate-story <image> <story title...> - Evaluate against a built-in story");
    println!("  stories                                 - List built-in stories");
    println!("  serve                                   - Start the HTTP API");
    println!("  help                                    - Show this message");
}

async fn run_evaluation(image_path: &str, story: &str) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let client = OpenAIClient::new(&config)?;
    let report = pipeline::evaluate(&client, image_path, story).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("story_canvas=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = args.first().map(String::as_str).unwrap_or("help");

    match cmd {
        "evaluate" => {
            if args.len() < 3 {
                eprintln!("Usage: story_canvas evaluate <image> <story text...>");
                anyhow::bail!("missing arguments for 'evaluate'");
            }
            run_evaluation(&args[1], &args[2..].join(" ")).await?;
        }
        "evaluate-story" => {
            if args.len() < 3 {
                eprintln!("Usage: story_canvas evaluate-story <image> <story title...>");
                anyhow::bail!("missing arguments for 'evaluate-story'");
            }
            let title = args[2..].join(" ");
            let story = StoryRegistry::new()
                .get(&title)
                .ok_or_else(|| anyhow::anyhow!("No built-in story titled '{}'", title))?;
            run_evaluation(&args[1], &story.text).await?;
        }
        "stories" => {
            for story in StoryRegistry::new().list() {
                println!("📚 {}", story.title);
                println!("   {}", story.text);
            }
        }
        "serve" => {
            let config = Config::from_env()?;
            let client = Arc::new(OpenAIClient::new(&config)?);
            api_server::start_api_server(&config, client).await?;
        }
        "help" | "--help" | "-h" => print_help(),
        other => {
            eprintln!("Unknown command '{}'. Run 'story_canvas help' for usage.", other);
            return Err(anyhow::anyhow!("unknown command '{}'", other));
        }
    }

    Ok(())
}

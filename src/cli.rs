//! Command-line interface
//!
//! Thin layer mapping subcommands 1:1 onto storage and generator
//! operations. All real behavior lives in the library; this module only
//! parses arguments, wires the pieces together, and prints results.

use crate::config::Config;
use crate::error::Result;
use crate::generator::Generator;
use crate::pipeline::CommandPipeline;
use crate::storage::BlogStorage;
use crate::types::Event;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// blog-writer - generate blog posts via a retrying pipeline and manage stored results
#[derive(Parser, Debug)]
#[command(name = "blog-writer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new blog post for a topic
    Generate {
        /// The blog topic
        topic: String,

        /// Maximum generation attempts (overrides config)
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Delay between attempts in seconds (overrides config)
        #[arg(long)]
        retry_delay_secs: Option<u64>,

        /// Pipeline command to run, given after `--`
        /// (e.g. `-- crew-runner --profile blog`)
        #[arg(last = true, required = true)]
        pipeline_command: Vec<String>,
    },

    /// List all blogs in storage
    List,

    /// Show a specific blog from storage
    Show {
        /// Directory name or topic of the blog
        blog_id: String,
    },

    /// Search blogs by topic or directory name
    Search {
        /// Case-insensitive substring to look for
        query: String,
    },

    /// Delete a blog and its directory from storage
    Delete {
        /// Directory name or topic of the blog
        blog_id: String,
    },

    /// Show storage statistics
    Stats,

    /// Show the most recently created blog
    Latest,

    /// List generated files in the output directory
    Outputs,

    /// Show a specific file from the output directory
    ShowOutput {
        /// Filename inside the output directory
        filename: String,
    },
}

/// Parse arguments and run the selected command
///
/// # Errors
///
/// Returns any error from the underlying operation; the binary entry point
/// prints it to stderr and exits non-zero.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Generate {
            topic,
            max_attempts,
            retry_delay_secs,
            pipeline_command,
        } => {
            generate(
                config,
                &topic,
                max_attempts,
                retry_delay_secs,
                pipeline_command,
            )
            .await
        }
        Command::List => list(&config),
        Command::Show { blog_id } => show(&config, &blog_id),
        Command::Search { query } => search(&config, &query),
        Command::Delete { blog_id } => delete(&config, &blog_id),
        Command::Stats => stats(&config),
        Command::Latest => latest(&config),
        Command::Outputs => outputs(&config),
        Command::ShowOutput { filename } => show_output(&config, &filename),
    }
}

// Logs go to stderr so stdout stays parseable command output.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

async fn generate(
    mut config: Config,
    topic: &str,
    max_attempts: Option<u32>,
    retry_delay_secs: Option<u64>,
    pipeline_command: Vec<String>,
) -> Result<()> {
    if let Some(attempts) = max_attempts {
        config.retry.max_attempts = attempts;
    }
    if let Some(secs) = retry_delay_secs {
        config.retry.retry_delay = std::time::Duration::from_secs(secs);
    }

    let mut parts = pipeline_command.into_iter();
    // clap guarantees at least one element via `required = true`
    let program = PathBuf::from(parts.next().unwrap_or_default());
    let args: Vec<String> = parts.collect();

    let storage = BlogStorage::open(&config.storage.root_dir)?;
    let pipeline = Arc::new(CommandPipeline::new(
        program,
        args,
        config.output.work_dir.clone(),
    ));
    let generator = Generator::new(pipeline, storage, config);

    // Ctrl-C cancels the run instead of killing the process mid-commit
    let token = generator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling run");
            token.cancel();
        }
    });

    let mut events = generator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::AttemptStarted {
                    attempt,
                    max_attempts,
                } => println!("Running blog generation (attempt {attempt}/{max_attempts})..."),
                Event::AttemptFailed { attempt, error } => {
                    println!("Attempt {attempt} failed: {error}");
                }
                Event::ArtifactDiscovered { stage } => {
                    println!("Found {stage} blog post artifact");
                }
                Event::Committed {
                    output_path,
                    storage_path,
                } => {
                    println!("Final blog post saved to: {}", output_path.display());
                    println!("Also saved to storage: {}", storage_path.display());
                }
            }
        }
    });

    let result = generator.generate(topic).await;
    drop(generator);
    printer.await.ok();

    let outcome = result?;
    println!(
        "Done after {} attempt{}.",
        outcome.attempts,
        if outcome.attempts == 1 { "" } else { "s" }
    );
    Ok(())
}

fn list(config: &Config) -> Result<()> {
    let storage = BlogStorage::open(&config.storage.root_dir)?;
    let blogs = storage.list();

    if blogs.is_empty() {
        println!("No blog posts found in storage.");
        return Ok(());
    }

    println!("Stored blog posts:");
    for (i, blog) in blogs.iter().enumerate() {
        println!("{}. Topic: {}", i + 1, blog.topic);
        println!("   Directory: {}", blog.directory);
        println!("   Stage: {}", blog.stage);
        println!("   Created: {}", blog.created_at.to_rfc3339());
        println!("   File: {}", blog.filename);
    }
    Ok(())
}

fn show(config: &Config, blog_id: &str) -> Result<()> {
    let storage = BlogStorage::open(&config.storage.root_dir)?;
    match storage.get(blog_id)? {
        Some(content) => {
            println!("{content}");
        }
        None => println!("Blog '{blog_id}' not found."),
    }
    Ok(())
}

fn search(config: &Config, query: &str) -> Result<()> {
    let storage = BlogStorage::open(&config.storage.root_dir)?;
    let results = storage.search(query);

    if results.is_empty() {
        println!("No blogs found matching '{query}'.");
        return Ok(());
    }

    println!("Search results for '{query}':");
    for (i, blog) in results.iter().enumerate() {
        println!("{}. Topic: {}", i + 1, blog.topic);
        println!("   Directory: {}", blog.directory);
        println!("   Created: {}", blog.created_at.to_rfc3339());
    }
    Ok(())
}

fn delete(config: &Config, blog_id: &str) -> Result<()> {
    let mut storage = BlogStorage::open(&config.storage.root_dir)?;
    if storage.delete(blog_id)? {
        println!("Blog '{blog_id}' deleted.");
    } else {
        println!("Blog '{blog_id}' not found.");
    }
    Ok(())
}

fn stats(config: &Config) -> Result<()> {
    let storage = BlogStorage::open(&config.storage.root_dir)?;
    let stats = storage.stats();

    println!("Storage statistics:");
    println!("  Total blogs: {}", stats.total_blogs);
    println!("  Total size: {} MB", stats.total_size_mb);
    println!("  Storage directory: {}", stats.storage_directory.display());
    Ok(())
}

fn latest(config: &Config) -> Result<()> {
    let storage = BlogStorage::open(&config.storage.root_dir)?;
    let Some(blog) = storage.latest() else {
        println!("No blogs found in storage.");
        return Ok(());
    };

    println!("Latest blog:");
    println!("  Topic: {}", blog.topic);
    println!("  Directory: {}", blog.directory);
    println!("  Created: {}", blog.created_at.to_rfc3339());

    if let Some(content) = storage.get(&blog.directory)? {
        let preview: String = content.chars().take(200).collect();
        println!("\nContent preview:");
        if content.chars().count() > 200 {
            println!("{preview}...");
        } else {
            println!("{preview}");
        }
    }
    Ok(())
}

fn outputs(config: &Config) -> Result<()> {
    let output_dir = &config.output.output_dir;
    if !output_dir.is_dir() {
        println!("No output directory found.");
        return Ok(());
    }

    let mut files: Vec<(PathBuf, std::fs::Metadata)> = std::fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|path| {
            std::fs::metadata(&path)
                .ok()
                .map(|metadata| (path, metadata))
        })
        .collect();

    if files.is_empty() {
        println!("No blog posts found in output directory.");
        return Ok(());
    }

    // Newest first
    files.sort_by_key(|(_, metadata)| {
        std::cmp::Reverse(metadata.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH))
    });

    println!("Blog posts in output directory:");
    for (i, (path, metadata)) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}. {}", i + 1, name);
        if let Ok(modified) = metadata.modified() {
            let when: chrono::DateTime<chrono::Local> = modified.into();
            println!("   Created: {}", when.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("   Size: {} bytes", metadata.len());
    }
    Ok(())
}

fn show_output(config: &Config, filename: &str) -> Result<()> {
    let path = config.output.output_dir.join(filename);
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            println!("{content}");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("File '{filename}' not found in output directory.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

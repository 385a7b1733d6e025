use clap::{Parser, Subcommand};
// Import database types directly from the database crate
use database::connection::{connect, run_migrations};
use database::repository::CatalogRepository;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Alexandria catalog application.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file, if one exists.
    dotenvy::dotenv().ok();

    // Route tracing output through the RUST_LOG env filter.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Initialize the database connection and run migrations
    let db_pool = connect()
        .await
        .expect("Failed to connect to the database");
    run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("connected to catalog database");

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    if let Err(e) = run_command(cli.command, db_pool).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A command-line front end for the library catalog data-access layer.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new catalog account.
    AddUser(AddUserArgs),
    /// Check a username/password pair against the stored credentials.
    Login(CredentialArgs),
    /// Show one page of the reading lists a user has created.
    Lists(ListsArgs),
    /// Full-text search over title names.
    SearchTitles(SearchArgs),
    /// Full-text search over author names.
    SearchAuthors(SearchArgs),
    /// Full-text search over category descriptions.
    SearchCategories(SearchArgs),
    /// Full-text search over usernames.
    SearchUsers(SearchArgs),
    /// Resolve a username to its numeric identifier.
    UserId(UserIdArgs),
    /// Show every catalogued edition attributed to an author.
    AuthorBooks(AuthorBooksArgs),
}

#[derive(Parser)]
struct AddUserArgs {
    /// The username for the new account.
    #[arg(long)]
    username: String,

    /// The plaintext password; it is hashed before storage.
    #[arg(long)]
    password: String,

    /// The contact email address.
    #[arg(long)]
    email: String,
}

#[derive(Parser)]
struct CredentialArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,
}

#[derive(Parser)]
struct ListsArgs {
    /// The numeric identifier of the list creator.
    #[arg(long)]
    user_id: i32,

    /// The 1-based page number (50 lists per page).
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Parser)]
struct SearchArgs {
    /// The free-text query to match against the search index.
    query: String,
}

#[derive(Parser)]
struct UserIdArgs {
    #[arg(long)]
    username: String,
}

#[derive(Parser)]
struct AuthorBooksArgs {
    /// The numeric identifier of the author.
    #[arg(long)]
    author_id: i32,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Dispatches one parsed subcommand against the repository.
async fn run_command(command: Commands, db_pool: sqlx::PgPool) -> anyhow::Result<()> {
    let repo = CatalogRepository::new(db_pool);

    match command {
        Commands::AddUser(args) => {
            repo.add_user(&args.username, &args.password, &args.email)
                .await?;
            println!("Created user {}", args.username);
        }
        Commands::Login(args) => {
            if repo
                .verify_credentials(&args.username, &args.password)
                .await?
            {
                println!("Credentials accepted for {}", args.username);
            } else {
                println!("Credentials rejected for {}", args.username);
            }
        }
        Commands::Lists(args) => {
            let lists = repo.user_lists(args.user_id, args.page).await?;
            if lists.is_empty() {
                println!("No lists on page {} for user {}", args.page, args.user_id);
            }
            for row in lists {
                println!("{}", row.list_title);
            }
        }
        Commands::SearchTitles(args) => {
            for hit in repo.search_titles(&args.query).await? {
                println!("{}\t{} (edition {})", hit.title_id, hit.title, hit.edition_id);
            }
        }
        Commands::SearchAuthors(args) => {
            for hit in repo.search_authors(&args.query).await? {
                println!("{}\t{}", hit.author_id, hit.author_name);
            }
        }
        Commands::SearchCategories(args) => {
            for hit in repo.search_categories(&args.query).await? {
                println!("{}\t{}", hit.category_id, hit.cat_description);
            }
        }
        Commands::SearchUsers(args) => {
            for hit in repo.search_users(&args.query).await? {
                println!("{}\t{}", hit.user_id, hit.username);
            }
        }
        Commands::UserId(args) => {
            let id = repo.user_id(&args.username).await?;
            println!("{}", id);
        }
        Commands::AuthorBooks(args) => {
            for book in repo.author_books(args.author_id).await? {
                let published = book
                    .pub_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown date".to_string());
                println!(
                    "{}: {} [{}], {} pages, {} ({}), ISBN {}",
                    book.author_name,
                    book.title,
                    book.edition_name,
                    book.page_count,
                    book.pub_name,
                    published,
                    book.isbn
                );
            }
        }
    }

    Ok(())
}

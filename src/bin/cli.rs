use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::error::Error;
use std::path::PathBuf;

use quiz_cms::db::queries::categories::{get_all_categories, import_categories};
use quiz_cms::db::queries::questions::{
    get_all_options, get_all_questions, import_questions,
};
use quiz_cms::db::{establish_connection, run_migrations};
use quiz_cms::db::{AnswerOption, Category, QuestionRecord};
use quiz_cms::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database path
    db_path: PathBuf,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import data from a directory of CSV files
    Import { path: PathBuf },
    /// Export data to a directory of CSV files
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let pool = establish_connection(&cli.db_path.display().to_string())
        .await
        .expect("Cannot connect to DB");
    run_migrations(&pool).await.expect("Migrations failed");
    match cli.command {
        Commands::Export { path } => export_data(&pool, path).await.expect("Cannot export"),
        Commands::Import { path } => import_data(&pool, path).await.expect("Cannot import"),
    }
}

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: PathBuf) -> Result<Vec<T>, Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

async fn export_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    let options = get_all_options(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(&path)?
    }
    write_to(path.join("categories.csv"), categories)?;
    write_to(path.join("questions.csv"), questions)?;
    write_to(path.join("options.csv"), options)?;
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let categories: Vec<Category> = read_from(path.join("categories.csv"))?;
    let questions: Vec<QuestionRecord> = read_from(path.join("questions.csv"))?;
    let options: Vec<AnswerOption> = read_from(path.join("options.csv"))?;
    import_categories(pool, categories).await?;
    import_questions(pool, questions, options).await?;
    Ok(())
}

//! shelfdb command-line interface.
//!
//! One subcommand per engine operation; schemas and rows are passed as JSON
//! on the command line and results are printed as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use shelfdb::db::{Engine, EngineConfig};
use shelfdb::schema::Schema;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut dir = PathBuf::from("databases");
    let mut verbose = false;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--dir" => {
                i += 1;
                if i < args.len() {
                    dir = PathBuf::from(&args[i]);
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("shelfdb v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                if arg.starts_with('-') {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
                positional.push(arg.to_string());
            }
        }
        i += 1;
    }

    let Some((command, rest)) = positional.split_first() else {
        print_help();
        return ExitCode::FAILURE;
    };

    let config = EngineConfig::new(dir).verbose(verbose);
    let engine = match Engine::open_with_config(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error opening store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&engine, command, rest) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &Engine, command: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    match (command, args) {
        ("create-db", [db]) => {
            engine.create_database(db)?;
            println!("Database {} created successfully", db);
        }
        ("list-dbs", []) => {
            print_json(&engine.list_databases()?)?;
        }
        ("create-table", [db, table, schema]) => {
            let schema: Schema = serde_json::from_str(schema)?;
            engine.create_table(db, table, schema)?;
            println!("Table {} added successfully", table);
        }
        ("drop-table", [db, table]) => {
            engine.drop_table(db, table)?;
            println!("Table {} deleted successfully", table);
        }
        ("tables", [db]) => {
            print_json(&engine.list_tables(db)?)?;
        }
        ("schema", [db, table]) => {
            print_json(&engine.table_schema(db, table)?)?;
        }
        ("insert", [db, table, row]) => {
            let row: serde_json::Value = serde_json::from_str(row)?;
            let row = row.as_object().ok_or("row must be a JSON object")?;
            engine.insert_row(db, table, row)?;
            println!("Row added successfully");
        }
        ("delete-row", [db, table, position]) => {
            let position: usize = position.parse()?;
            engine.delete_row(db, table, position)?;
            println!("Row deleted successfully");
        }
        ("rows", [db, table]) => {
            print_json(&engine.rows(db, table)?)?;
        }
        ("intersect", [db, left, right]) => {
            print_json(&engine.intersect(db, left, right)?)?;
        }
        (command, _) => {
            return Err(format!(
                "unknown command or wrong arguments: {} (try --help)",
                command
            )
            .into());
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_help() {
    println!("shelfdb - a minimal file-backed record database");
    println!();
    println!("Usage: shelfdb [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  create-db <db>                          Create a database");
    println!("  list-dbs                                List databases");
    println!("  create-table <db> <table> <schema>      Create a table (schema as JSON)");
    println!("  drop-table <db> <table>                 Delete a table");
    println!("  tables <db>                             List tables");
    println!("  schema <db> <table>                     Show a table's schema");
    println!("  insert <db> <table> <row>               Insert a row (row as JSON)");
    println!("  delete-row <db> <table> <position>      Delete the row at a position");
    println!("  rows <db> <table>                       List all rows");
    println!("  intersect <db> <table1> <table2>        Rows of table1 also in table2");
    println!();
    println!("Options:");
    println!("  -d, --dir PATH    Data directory (default: databases)");
    println!("  -v, --verbose     Log operations to stderr");
    println!("  -h, --help        Show this help message");
    println!("  --version         Show version");
    println!();
    println!("Examples:");
    println!("  shelfdb create-db testdb");
    println!("  shelfdb create-table testdb users '{{\"id\":\"integer\",\"name\":\"string\"}}'");
    println!("  shelfdb insert testdb users '{{\"id\":\"1\",\"name\":\"Alice\"}}'");
    println!("  shelfdb intersect testdb t1 t2");
}

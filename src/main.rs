//! Command-line interface for xsdform

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path as FsPath, PathBuf};
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use xsdform::converters::{bulk, parse_csv, write_csv, CdataOverrides, ValueStore};
#[cfg(feature = "cli")]
use xsdform::validators::{parse_schema, NodeKind, SchemaNode, ValidationErrors};
#[cfg(feature = "cli")]
use xsdform::{DirectoryStorage, FormError, FormSession, Path, SchemaStorage};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdform")]
#[command(author, version, about = "Form model, XML generation and import for XSD schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the form model built from an XSD schema
    Inspect {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output the model as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Generate an XML document from form values
    Generate {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// JSON file with the form values
        #[arg(value_name = "VALUES")]
        values: PathBuf,

        /// JSON file mapping field paths to CDATA on/off
        #[arg(long, value_name = "FILE")]
        cdata: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate even if the values are invalid
        #[arg(long)]
        no_validate: bool,
    },

    /// Import an XML document into form values
    Import {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// XML document to import
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate form values against a schema
    Validate {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// JSON file with the form values
        #[arg(value_name = "VALUES")]
        values: PathBuf,
    },

    /// Print the CSV header for bulk filling a repeated element
    Template {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path of the repeated element, e.g. Invoice.Items.Item
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Fill a repeated element from CSV rows
    Fill {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path of the repeated element, e.g. Invoice.Items.Item
        #[arg(value_name = "PATH")]
        path: String,

        /// CSV file with a header row
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Existing form values to fill into
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// Columns to wrap in CDATA (repeatable)
        #[arg(long = "cdata-column", value_name = "COLUMN")]
        cdata_columns: Vec<String>,

        /// Print the generated XML instead of the values
        #[arg(long)]
        xml: bool,
    },

    /// Export the items of a repeated element as CSV
    Export {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// JSON file with the form values
        #[arg(value_name = "VALUES")]
        values: PathBuf,

        /// Path of the repeated element, e.g. Invoice.Items.Item
        #[arg(value_name = "PATH")]
        path: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage stored schemas
    Schemas {
        /// Storage directory
        #[arg(short, long, value_name = "DIR", default_value = "schemas")]
        dir: PathBuf,

        #[command(subcommand)]
        action: SchemaAction,
    },
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum SchemaAction {
    /// List stored schemas
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Store a schema file
    Add {
        /// Schema file to copy into storage
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Rename a stored schema
    Rename {
        /// Current filename
        old: String,
        /// New name; the old extension is kept when omitted
        new: String,
    },
    /// Delete a stored schema
    Delete {
        /// Filename to delete
        filename: String,
    },
}

#[cfg(feature = "cli")]
type CliResult = Result<(), Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { schema, json } => cmd_inspect(schema, json),
        Commands::Generate {
            schema,
            values,
            cdata,
            output,
            no_validate,
        } => cmd_generate(schema, values, cdata, output, no_validate),
        Commands::Import {
            schema,
            file,
            pretty,
            output,
        } => cmd_import(schema, file, pretty, output),
        Commands::Validate { schema, values } => cmd_validate(schema, values),
        Commands::Template { schema, path } => cmd_template(schema, path),
        Commands::Fill {
            schema,
            path,
            csv,
            values,
            cdata_columns,
            xml,
        } => cmd_fill(schema, path, csv, values, cdata_columns, xml),
        Commands::Export {
            schema,
            values,
            path,
            output,
        } => cmd_export(schema, values, path, output),
        Commands::Schemas { dir, action } => cmd_schemas(dir, action),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn load_schema(path: &FsPath) -> Result<SchemaNode, Box<dyn std::error::Error>> {
    let xsd = fs::read_to_string(path)?;
    Ok(parse_schema(&xsd)?)
}

#[cfg(feature = "cli")]
fn load_values(path: &FsPath) -> Result<ValueStore, Box<dyn std::error::Error>> {
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(ValueStore::from_json(json)?)
}

#[cfg(feature = "cli")]
fn write_output(output: Option<PathBuf>, content: &str) -> CliResult {
    match output {
        Some(path) => fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_errors(errors: &ValidationErrors) {
    println!("✗ Values are invalid");
    println!();
    println!("Errors:");
    for (path, message) in errors {
        println!("  - {}: {}", path, message);
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: PathBuf, json_output: bool) -> CliResult {
    let schema = load_schema(&schema_path)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!("xsdform v{}", xsdform::VERSION);
    println!();
    println!("Schema Information:");
    println!("  Root Element: {}", schema.name);
    println!("  Components: {}", schema.component_count());
    println!("  Depth: {}", schema.depth());
    println!();
    println!("=== Form Tree ===");
    print_node(&schema, 1);
    Ok(())
}

#[cfg(feature = "cli")]
fn print_node(node: &SchemaNode, level: usize) {
    let indent = "  ".repeat(level);
    let occurs = match (node.occurs.min, node.occurs.max) {
        (1, Some(1)) => String::new(),
        (min, Some(max)) => format!(" [{}..{}]", min, max),
        (min, None) => format!(" [{}..*]", min),
    };

    match &node.kind {
        NodeKind::Complex(complex) => {
            println!("{}{}{}", indent, node.name, occurs);
            for attribute in &complex.attributes {
                let required = if attribute.is_required() { " (required)" } else { "" };
                println!("{}  @{} : {}{}", indent, attribute.name, attribute.base_type, required);
            }
            for child in &complex.children {
                print_node(child, level + 1);
            }
        }
        NodeKind::Simple(simple) => {
            let cdata = if simple.use_cdata { " cdata" } else { "" };
            println!(
                "{}{} : {} <{}>{}{}",
                indent, node.name, simple.base_type, simple.input_type, occurs, cdata
            );
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_generate(
    schema_path: PathBuf,
    values_path: PathBuf,
    cdata_path: Option<PathBuf>,
    output: Option<PathBuf>,
    no_validate: bool,
) -> CliResult {
    let schema = load_schema(&schema_path)?;
    let mut session = FormSession::new(Arc::new(schema));
    session.set_values(load_values(&values_path)?);

    if let Some(path) = cdata_path {
        let overrides: CdataOverrides = serde_json::from_str(&fs::read_to_string(path)?)?;
        session.set_cdata_overrides(overrides);
    }

    let xml = if no_validate {
        session.preview()
    } else {
        match session.generate() {
            Ok(xml) => xml,
            Err(FormError::Invalid(errors)) => {
                print_errors(&errors);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        }
    };

    write_output(output, &xml)
}

#[cfg(feature = "cli")]
fn cmd_import(schema_path: PathBuf, file: PathBuf, pretty: bool, output: Option<PathBuf>) -> CliResult {
    let schema = load_schema(&schema_path)?;
    let xml = fs::read_to_string(&file)?;

    let mut session = FormSession::new(Arc::new(schema));
    session.import_xml(&xml)?;

    let values = session.values().to_json();
    let json = if pretty {
        serde_json::to_string_pretty(values)?
    } else {
        serde_json::to_string(values)?
    };

    write_output(output, &json)
}

#[cfg(feature = "cli")]
fn cmd_validate(schema_path: PathBuf, values_path: PathBuf) -> CliResult {
    let schema = load_schema(&schema_path)?;
    let mut session = FormSession::new(Arc::new(schema));
    session.set_values(load_values(&values_path)?);

    let errors = session.validate();
    if errors.is_empty() {
        println!("✓ Values are valid");
        Ok(())
    } else {
        print_errors(errors);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn repeated_node<'a>(schema: &'a SchemaNode, path: &Path) -> Result<&'a SchemaNode, Box<dyn std::error::Error>> {
    match schema.find(path) {
        Some(node) if node.is_multiple() => Ok(node),
        Some(_) => Err(format!("{} is not a repeated element", path).into()),
        None => Err(format!("{} is not declared in the schema", path).into()),
    }
}

#[cfg(feature = "cli")]
fn cmd_template(schema_path: PathBuf, path: String) -> CliResult {
    let schema = load_schema(&schema_path)?;
    let path: Path = path.parse()?;
    let node = repeated_node(&schema, &path)?;

    print!("{}", bulk::csv_template(node));

    let cdata = bulk::cdata_columns(node);
    if !cdata.eligible.is_empty() {
        eprintln!("CDATA columns: {}", cdata.eligible.join(", "));
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_fill(
    schema_path: PathBuf,
    path: String,
    csv: PathBuf,
    values: Option<PathBuf>,
    cdata_columns: Vec<String>,
    xml: bool,
) -> CliResult {
    let schema = load_schema(&schema_path)?;
    let path: Path = path.parse()?;

    let mut session = FormSession::new(Arc::new(schema));
    if let Some(values) = values {
        session.set_values(load_values(&values)?);
    }

    let rows = parse_csv(&fs::read_to_string(&csv)?)?;
    let count = session.bulk_import(&path, &rows, &cdata_columns)?;
    eprintln!("Imported {} item(s) into {}", count, path);

    if xml {
        println!("{}", session.preview());
    } else {
        println!("{}", serde_json::to_string_pretty(session.values().to_json())?);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_export(schema_path: PathBuf, values_path: PathBuf, path: String, output: Option<PathBuf>) -> CliResult {
    let schema = load_schema(&schema_path)?;
    let path: Path = path.parse()?;

    let mut session = FormSession::new(Arc::new(schema));
    session.set_values(load_values(&values_path)?);

    let rows = session.export_rows(&path)?;
    let csv = write_csv(&rows);
    match output {
        Some(file) => fs::write(file, csv)?,
        None => print!("{}", csv),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_schemas(dir: PathBuf, action: SchemaAction) -> CliResult {
    let storage = DirectoryStorage::open(dir)?;

    match action {
        SchemaAction::List { json } => {
            let entries = storage.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!("{}\t{}", entry.filename, entry.size);
                }
            }
        }
        SchemaAction::Add { file } => {
            let content = fs::read_to_string(&file)?;
            // refuse to store what cannot be parsed
            parse_schema(&content)?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or("schema file has no usable name")?;
            println!("{}", storage.write(name, &content)?);
        }
        SchemaAction::Rename { old, new } => {
            println!("{}", storage.rename(&old, &new)?);
        }
        SchemaAction::Delete { filename } => {
            storage.delete(&filename)?;
        }
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}

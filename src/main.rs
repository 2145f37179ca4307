mod config;
mod contact;
mod form;
mod logging;
mod pagination;
mod regions;
mod search;
mod selection;
mod ui;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use contact::{Contact, Field};
use form::FormState;
use pagination::Pager;

#[derive(Parser, Debug)]
#[command(name = "cfind", about = "Search a contact list and pick one")]
struct Cli {
    /// Configuration file (defaults to the XDG config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON contact list replacing the bundled one
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Rows per results page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Log file (defaults to the XDG data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print matching contacts as tab-separated rows
    Query(QueryArgs),
    /// List the region codes accepted by the State field
    Regions,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Phone number, +1 followed by ten digits
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// Region code, see `cfind regions`
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    zip: Option<String>,

    /// Extra criteria as KEY=PATTERN, keyed by JSON field name (e.g. city=toronto)
    #[arg(long = "match", value_name = "KEY=PATTERN", value_parser = parse_match)]
    matches: Vec<(Field, String)>,

    /// 1-based page to print; clamped to the last page
    #[arg(long, default_value_t = 1)]
    page: usize,
}

impl QueryArgs {
    fn form(&self) -> FormState {
        let mut form = FormState::new();
        let pairs = [
            (Field::FirstName, &self.first_name),
            (Field::LastName, &self.last_name),
            (Field::DateOfBirth, &self.dob),
            (Field::Email, &self.email),
            (Field::PhoneNumber, &self.phone),
            (Field::Address, &self.address),
            (Field::City, &self.city),
            (Field::State, &self.region),
            (Field::ZipCode, &self.zip),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                form.set(field, value.as_str());
            }
        }
        for (field, value) in &self.matches {
            form.set(*field, value.as_str());
        }
        form
    }
}

fn parse_match(raw: &str) -> Result<(Field, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=PATTERN, got `{}`", raw))?;
    let field = Field::from_key(key).ok_or_else(|| {
        let known: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        format!("unknown field `{}` (expected one of {})", key, known.join(", "))
    })?;
    Ok((field, value.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match &cli.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };
    if let Err(err) = logging::init(&log_path) {
        eprintln!("warning: logging disabled: {}", err);
    }

    if let Some(Command::Regions) = cli.command {
        for code in regions::codes() {
            println!("{}", code);
        }
        return Ok(());
    }

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(size) = cli.page_size {
        if size == 0 {
            bail!("--page-size must be at least 1");
        }
        config.page_size = size;
    }

    let data = cli.data.clone().or_else(|| config.data.clone());
    let contacts = contact::load(data.as_deref())?;

    match cli.command {
        Some(Command::Query(args)) => handle_query(args, &config, &contacts),
        Some(Command::Regions) => Ok(()),
        None => {
            if let Some(path) = &config.config_path {
                println!("Loaded configuration from {}", path.display());
            }
            let mut app = ui::app::App::new(&config, contacts);
            app.run()
        }
    }
}

fn handle_query(args: QueryArgs, config: &config::Config, contacts: &[Contact]) -> Result<()> {
    let form = args.form();
    let rules = config.validation.clone().without_required_last_name();
    form.validate(&rules)
        .context("invalid search criteria")?;

    if form.is_pristine() {
        tracing::debug!("query without criteria, listing every contact");
    }
    let criteria = form.criteria();
    let results = search::filter(contacts, &criteria);

    if results.is_empty() {
        println!("No matches");
        return Ok(());
    }

    let mut pager = Pager::new(config.page_size);
    pager.go_to(args.page, results.len());
    println!(
        "Found {} contact(s), page {} of {}",
        results.len(),
        pager.page(),
        pager.total_pages(results.len())
    );

    // name<TAB>dob<TAB>email<TAB>phone<TAB>address<TAB>city<TAB>state<TAB>zip
    for contact in pager.slice(&results) {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            contact.display_name(),
            contact.date_of_birth,
            contact.email,
            contact.phone_number,
            contact.address,
            contact.city,
            contact.state,
            contact.zip_code
        );
    }

    Ok(())
}

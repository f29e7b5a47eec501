use super::logging::init_logging;
use super::render::{
    print_messages, render_json, render_product_detail, render_product_grid, RenderOptions,
};
use super::setup::{Cli, Commands, OutputFormat};
use anyhow::{Context, Result};
use catalogapp::catalog::ProductFilter;
use catalogapp::config::CatalogConfig;
use catalogapp::form::ProductForm;
use catalogapp::init::{load_settings, start_with, CatalogContext, CatalogPaths, InitOptions};
use catalogapp::model::{Field, ProductId};
use catalogapp::outcome::{CmdMessage, CmdResult};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Text values for the form, as they came from the command line.
#[derive(Debug, Default)]
struct FieldInput {
    name: Option<String>,
    price: Option<String>,
    description: Option<String>,
    category: Option<String>,
    image: Option<PathBuf>,
    clear_image: bool,
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let options = InitOptions {
        data_dir: cli.data_dir.clone(),
        config_file: cli.config.clone(),
    };
    let (config, paths) = load_settings(&options)?;
    init_logging(&config.log_level, cli.verbose);

    // `config` never needs the store.
    if let Some(Commands::Config) = cli.command {
        return Ok(handle_config(&config, &paths));
    }

    let mut ctx = start_with(config, paths).await;
    debug!(command = ?cli.command, "Dispatching");

    match cli.command {
        Some(Commands::List {
            category,
            search,
            output,
        }) => handle_list(&ctx, ProductFilter { category, search }, output),
        None => handle_list(&ctx, ProductFilter::default(), OutputFormat::Text),
        Some(Commands::Add {
            name,
            price,
            description,
            category,
            image,
        }) => {
            let input = FieldInput {
                name: Some(name),
                price: Some(price),
                description: Some(description),
                category: Some(category),
                image: Some(image),
                clear_image: false,
            };
            handle_add(&mut ctx, input).await
        }
        Some(Commands::Edit {
            id,
            name,
            price,
            description,
            category,
            image,
            clear_image,
        }) => {
            let input = FieldInput {
                name,
                price,
                description,
                category,
                image,
                clear_image,
            };
            handle_edit(&mut ctx, id, input).await
        }
        Some(Commands::Delete { ids }) => handle_delete(&mut ctx, &ids).await,
        Some(Commands::Show { id, output }) => handle_show(&ctx, id, output),
        Some(Commands::Init) => Ok(handle_init(&ctx)),
        Some(Commands::Config) => Ok(handle_config(&ctx.config, &ctx.paths)),
    }
}

fn handle_list(
    ctx: &CatalogContext,
    filter: ProductFilter,
    output: OutputFormat,
) -> Result<ExitCode> {
    if !ctx.catalog.is_ready() {
        return Ok(not_ready(&ctx.paths));
    }

    let products = ctx.catalog.filtered(&filter);
    match output {
        OutputFormat::Json => print!("{}", render_json(&products)?),
        OutputFormat::Text => print!(
            "{}",
            render_product_grid(&products, RenderOptions::detect())
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_show(ctx: &CatalogContext, id: ProductId, output: OutputFormat) -> Result<ExitCode> {
    if !ctx.catalog.is_ready() {
        return Ok(not_ready(&ctx.paths));
    }

    let Some(product) = ctx.catalog.get(id) else {
        return Ok(finish(&CmdResult::default().with_message(CmdMessage::error(
            format!("Product not found: #{}", id),
        ))));
    };
    match output {
        OutputFormat::Json => print!("{}", render_json(product)?),
        OutputFormat::Text => print!(
            "{}",
            render_product_detail(product, RenderOptions::detect())
        ),
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_add(ctx: &mut CatalogContext, input: FieldInput) -> Result<ExitCode> {
    let max_image_bytes = ctx.config.max_image_bytes;
    let form = ctx.catalog.open_create();
    fill_form(form, input, max_image_bytes).await?;

    let missing = form.missing_fields();
    if !missing.is_empty() {
        ctx.catalog.close();
        return Ok(finish(&missing_fields_result(&missing)));
    }

    Ok(finish(&ctx.catalog.submit().await))
}

async fn handle_edit(
    ctx: &mut CatalogContext,
    id: ProductId,
    input: FieldInput,
) -> Result<ExitCode> {
    if !ctx.catalog.is_ready() {
        return Ok(not_ready(&ctx.paths));
    }

    let max_image_bytes = ctx.config.max_image_bytes;
    let Some(form) = ctx.catalog.open_edit(id) else {
        return Ok(finish(&CmdResult::default().with_message(CmdMessage::error(
            format!("Product not found: #{}", id),
        ))));
    };
    fill_form(form, input, max_image_bytes).await?;

    // An edited product may keep (or drop) its image; the text fields stay required.
    let missing: Vec<Field> = form
        .missing_fields()
        .into_iter()
        .filter(|f| *f != Field::Image)
        .collect();
    if !missing.is_empty() {
        ctx.catalog.close();
        return Ok(finish(&missing_fields_result(&missing)));
    }

    Ok(finish(&ctx.catalog.submit().await))
}

async fn handle_delete(ctx: &mut CatalogContext, ids: &[ProductId]) -> Result<ExitCode> {
    let mut result = CmdResult::default();
    for &id in ids {
        let outcome = ctx.catalog.delete(id).await;
        result.messages.extend(outcome.messages);
        result.affected_products.extend(outcome.affected_products);
    }
    Ok(finish(&result))
}

fn handle_init(ctx: &CatalogContext) -> ExitCode {
    if !ctx.catalog.is_ready() {
        return not_ready(&ctx.paths);
    }
    let count = ctx.catalog.products().len();
    finish(&CmdResult::default().with_message(CmdMessage::success(format!(
        "Database ready at {} ({} product{})",
        ctx.paths.database_file.display(),
        count,
        if count == 1 { "" } else { "s" }
    ))))
}

fn handle_config(config: &CatalogConfig, paths: &CatalogPaths) -> ExitCode {
    for (key, value) in config.list_all() {
        println!("{} = {}", key, value);
    }
    println!();
    println!("data directory: {}", paths.data_dir.display());
    println!("database file:  {}", paths.database_file.display());
    match &paths.config_file {
        Some(file) if file.exists() => println!("config file:    {}", file.display()),
        Some(file) => println!("config file:    {} (not present)", file.display()),
        None => println!("config file:    (none)"),
    }
    ExitCode::SUCCESS
}

/// Copy flag values into the form. An image path starts a read whose result is applied
/// only if the form has not moved on to another image in the meantime.
async fn fill_form(
    form: &mut ProductForm,
    input: FieldInput,
    max_image_bytes: u64,
) -> Result<()> {
    if let Some(name) = input.name {
        form.set_name(&name);
    }
    if let Some(price) = input.price {
        form.set_price(&price);
    }
    if let Some(description) = input.description {
        form.set_description(&description);
    }
    if let Some(category) = input.category {
        form.set_category(&category);
    }
    if input.clear_image {
        form.clear_image();
    }
    if let Some(path) = input.image {
        let pending = form.begin_image_read(path);
        let loaded = pending
            .load(max_image_bytes)
            .await
            .context("Could not read image")?;
        if !form.apply_image(loaded) {
            debug!("Discarded stale image read");
        }
    }
    Ok(())
}

fn missing_fields_result(missing: &[Field]) -> CmdResult {
    let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
    CmdResult::default().with_message(CmdMessage::error(format!(
        "Missing required fields: {}",
        names.join(", ")
    )))
}

fn not_ready(paths: &CatalogPaths) -> ExitCode {
    finish(&CmdResult::default().with_message(CmdMessage::error(format!(
        "Product store is not available ({}); run with -v for details",
        paths.database_file.display()
    ))))
}

/// Print messages; any error-level message makes the command fail.
fn finish(result: &CmdResult) -> ExitCode {
    print_messages(&result.messages);
    if result.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

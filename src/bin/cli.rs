use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::{collections::HashMap, path::PathBuf};
use typeview::{
    define_struct,
    error::ViewError,
    memory::{BackingType, Region, RegionConfig},
    FieldKind, FieldValue, LayoutSchema, Result, StructOptions, TypeDescriptor, View,
};

fn main() -> Result<()> {
    env_logger::init();

    let define_arg = Arg::with_name("define")
        .short("d")
        .long("define")
        .value_name("NAME=FIELD:TYPE,...")
        .help("Declare a struct type; may be repeated, later types may use earlier ones")
        .multiple(true)
        .number_of_values(1)
        .takes_value(true);
    let type_arg = Arg::with_name("type")
        .value_name("TYPE")
        .help("Name of the type to inspect")
        .required(true)
        .index(1);

    let matches = App::new("typeview-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect struct layouts and the bytes they describe")
        .subcommand(
            SubCommand::with_name("layout")
                .about("Print size, alignment and field offsets of a type")
                .arg(define_arg.clone())
                .arg(type_arg.clone())
                .arg(
                    Arg::with_name("schema")
                        .long("schema")
                        .value_name("FILE")
                        .help("Also write the bincode-encoded layout schema to FILE")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("read")
                .about("Map a file and print every field of a view")
                .arg(define_arg)
                .arg(type_arg)
                .arg(
                    Arg::with_name("file")
                        .short("f")
                        .long("file")
                        .value_name("FILE")
                        .help("File to map")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("offset")
                        .short("o")
                        .long("offset")
                        .value_name("OFFSET")
                        .help("Byte offset of the view")
                        .default_value("0")
                        .takes_value(true),
                ),
        )
        .subcommand(SubCommand::with_name("info").about("Show version information"))
        .get_matches();

    match matches.subcommand() {
        ("layout", Some(layout_matches)) => handle_layout(layout_matches),
        ("read", Some(read_matches)) => handle_read(read_matches),
        ("info", Some(_)) => {
            println!("typeview {}", typeview::VERSION);
            Ok(())
        }
        _ => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn handle_layout(matches: &ArgMatches) -> Result<()> {
    let types = parse_definitions(matches)?;
    let ty = resolve_type(&types, matches)?;
    let schema = struct_of(&ty)?.schema();

    println!("{}: size {}, align {}", schema.name, schema.size, schema.align);
    print_schema(&schema, "", 0);

    if let Some(path) = matches.value_of("schema") {
        std::fs::write(path, schema.to_bytes()?)
            .map_err(|e| ViewError::from_io(e, "Failed to write schema file"))?;
        println!("Wrote schema to {}", path);
    }
    Ok(())
}

fn handle_read(matches: &ArgMatches) -> Result<()> {
    let types = parse_definitions(matches)?;
    let ty = resolve_type(&types, matches)?;
    let path = PathBuf::from(matches.value_of("file").unwrap_or_default());
    let offset: usize = matches
        .value_of("offset")
        .unwrap_or("0")
        .parse()
        .map_err(|_| ViewError::invalid_parameter("offset", "Invalid offset format"))?;

    let size = std::fs::metadata(&path)
        .map_err(|e| ViewError::from_io(e, "Failed to stat input file"))?
        .len() as usize;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());

    let region = Region::new(
        RegionConfig::new(name, size)
            .with_backing_type(BackingType::FileBacked)
            .with_file_path(&path)
            .with_create(false),
    )?;
    info!("mapped {} ({} bytes)", path.display(), region.len());

    let view = ty.view(&region, offset)?;
    let end = offset.saturating_add(view.byte_length());
    if end > region.len() {
        println!(
            "warning: view [{}, {}) extends past the end of the file ({} bytes)",
            offset,
            end,
            region.len()
        );
    }
    println!("{} @ {}", view.ty().name(), offset);
    print_view(&view, "");
    Ok(())
}

/// Parse every `--define NAME=field:type,...` in order
fn parse_definitions(matches: &ArgMatches) -> Result<HashMap<String, TypeDescriptor>> {
    let mut types = HashMap::new();
    for definition in matches.values_of("define").into_iter().flatten() {
        let (name, body) = definition.split_once('=').ok_or_else(|| {
            ViewError::invalid_parameter("define", format!("expected NAME=FIELDS in '{}'", definition))
        })?;

        let mut fields = Vec::new();
        for entry in body.split(',').filter(|s| !s.is_empty()) {
            let (field, type_name) = entry.split_once(':').ok_or_else(|| {
                ViewError::invalid_parameter("define", format!("expected FIELD:TYPE in '{}'", entry))
            })?;
            fields.push((field.trim().to_string(), lookup(&types, type_name.trim())?));
        }

        let ty = define_struct(fields, StructOptions::transparent().with_name(name.trim()))?;
        types.insert(name.trim().to_string(), ty);
    }
    Ok(types)
}

fn lookup(types: &HashMap<String, TypeDescriptor>, name: &str) -> Result<TypeDescriptor> {
    types
        .get(name)
        .cloned()
        .or_else(|| TypeDescriptor::from_name(name))
        .ok_or_else(|| ViewError::invalid_parameter("type", format!("unknown type '{}'", name)))
}

fn resolve_type(types: &HashMap<String, TypeDescriptor>, matches: &ArgMatches) -> Result<TypeDescriptor> {
    lookup(types, matches.value_of("type").unwrap_or_default())
}

fn struct_of(ty: &TypeDescriptor) -> Result<&typeview::StructType> {
    ty.as_struct()
        .map(|st| st.as_ref())
        .ok_or_else(|| ViewError::invalid_parameter("type", format!("'{}' is not a struct", ty.name())))
}

fn print_schema(schema: &LayoutSchema, prefix: &str, base: usize) {
    for field in &schema.fields {
        let path = format!("{}{}", prefix, field.name);
        match &field.kind {
            FieldKind::Numeric(kind) => {
                println!("  {:>6}  {:<8} {}", base + field.offset, kind.name(), path)
            }
            FieldKind::Struct(inner) => {
                println!("  {:>6}  {:<8} {}", base + field.offset, inner.name, path);
                print_schema(inner, &format!("{}.", path), base + field.offset);
            }
        }
    }
}

fn print_view(view: &View<'_>, prefix: &str) {
    for (name, value) in view.entries() {
        match value {
            FieldValue::Scalar(v) => println!("  {}{} = {}", prefix, name, v),
            FieldValue::Struct(child) => print_view(&child, &format!("{}{}.", prefix, name)),
        }
    }
}

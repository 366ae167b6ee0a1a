/// Text Linter: validates creature text tables before they are loaded.
///
/// Usage: text_linter <texts.ron> [--locales <path>] [--broadcast-texts <path>]

use creature_text::core::loader::{load_broadcast_texts, LoadError, RonTextSource, TextSource};
use creature_text::core::tables::TextTables;
use creature_text::schema::broadcast_text::{index_broadcast_texts, BroadcastTextStore};
use creature_text::schema::text::{LocaleRow, TextKey, TextRow};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: text_linter <texts.ron> [--locales <path>] [--broadcast-texts <path>]");
        process::exit(0);
    }

    let texts_path = &args[1];
    let mut locales_path = None;
    let mut broadcast_path = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--locales" if i + 1 < args.len() => {
                i += 1;
                locales_path = Some(args[i].clone());
            }
            "--broadcast-texts" if i + 1 < args.len() => {
                i += 1;
                broadcast_path = Some(args[i].clone());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut source = RonTextSource::new(texts_path);
    if let Some(ref path) = locales_path {
        source = source.with_locales(path);
    }

    let (texts, locales) = match read_rows(&mut source) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let broadcast_texts = match broadcast_path {
        Some(ref path) => match load_broadcast_texts(Path::new(path)) {
            Ok(records) => index_broadcast_texts(records),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        },
        None => FxHashMap::default(),
    };

    println!(
        "Read {} text rows, {} locale rows, {} broadcast texts",
        texts.len(),
        locales.len(),
        broadcast_texts.len()
    );

    let (errors, warnings) = lint_rows(&texts, &locales, &broadcast_texts, broadcast_path.is_some());

    println!("\n=== Creature Text Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    // What the engine would end up with after dropping bad rows
    let mut rebuilt = source;
    match TextTables::load(&mut rebuilt, &broadcast_texts) {
        Ok(tables) => {
            println!(
                "\nLoaded: {} entries in {} groups, {} localized keys",
                tables.catalog.len(),
                tables.catalog.group_count(),
                tables.locales.len()
            );
            let templates: BTreeSet<u32> = texts.iter().map(|r| r.entry).collect();
            for template in templates {
                let groups = tables.catalog.group_ids(template);
                if !groups.is_empty() {
                    println!("  creature {}: groups {:?}", template, groups);
                }
            }
        }
        Err(e) => println!("\nLoad failed: {}", e),
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn read_rows(source: &mut dyn TextSource) -> Result<(Vec<TextRow>, Vec<LocaleRow>), LoadError> {
    let mut texts = Vec::new();
    source.for_each_text_row(&mut |row| texts.push(row))?;
    let mut locales = Vec::new();
    source.for_each_locale_row(&mut |row| locales.push(row))?;
    Ok((texts, locales))
}

fn lint_rows(
    texts: &[TextRow],
    locales: &[LocaleRow],
    broadcast_texts: &dyn BroadcastTextStore,
    have_broadcast_texts: bool,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut seen: BTreeSet<TextKey> = BTreeSet::new();
    let mut groups: BTreeMap<(u32, u8), Vec<&TextRow>> = BTreeMap::new();

    for row in texts {
        let key = TextKey::new(row.entry, row.group, row.id);
        let label = format!("{}/{}/{}", row.entry, row.group, row.id);

        if !seen.insert(key) {
            errors.push(format!("{}: duplicate id, later row is ignored", label));
            continue;
        }
        if !row.weight.is_finite() || row.weight < 0.0 {
            errors.push(format!("{}: invalid weight {}", label, row.weight));
            continue;
        }

        if row.broadcast_text_id != 0
            && have_broadcast_texts
            && broadcast_texts.lookup(row.broadcast_text_id).is_none()
        {
            errors.push(format!(
                "{}: unknown broadcast text {}",
                label, row.broadcast_text_id
            ));
        }
        if row.text.is_empty() && row.broadcast_text_id == 0 {
            warnings.push(format!("{}: no text and no broadcast text", label));
        }

        groups.entry((row.entry, row.group)).or_default().push(row);
    }

    for ((entry, group), rows) in &groups {
        if rows.len() > 1 && rows.iter().all(|r| r.weight == 0.0) {
            warnings.push(format!(
                "{}/{}: every line has zero weight, draws will be uniform",
                entry, group
            ));
        }
    }

    if have_broadcast_texts {
        for row in texts.iter().filter(|r| r.broadcast_text_id == 0 && !r.text.is_empty()) {
            if let Some(record) = broadcast_texts
                .records()
                .find(|b| b.matches_default_text(&row.text))
            {
                warnings.push(format!(
                    "{}/{}/{}: text matches broadcast text {}, link it to get its translations",
                    row.entry, row.group, row.id, record.id
                ));
            }
        }
    }

    for row in locales {
        let key = row.key();
        let label = format!("{}/{}/{}", row.entry, row.group, row.id);
        if !seen.contains(&key) {
            errors.push(format!("{}: locale row for a missing entry", label));
            continue;
        }
        for (locale, text) in &row.texts {
            if text.is_empty() {
                warnings.push(format!("{}: empty {} text", label, locale.code()));
            }
        }
    }

    (errors, warnings)
}

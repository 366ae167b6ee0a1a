/// Preview: interactive shell for trying creature text tables.
///
/// Usage: preview <data_dir> [--seed <n>]
///
/// The data directory holds `texts.ron` and optionally `locales.ron`,
/// `broadcast_texts.ron` and `config.ron`.
///
/// Commands:
///   npc <template>               set the speaking creature
///   gender <male|female|none>    set the speaking creature's gender
///   groups                       list the creature's text groups
///   player <locale> [distance]   add a listener
///   say <group> [range]          select and send a line
///   line <group> <id>            send a specific line
///   whisper <group> <player#>    whisper a line to one listener
///   broadcast <id>               yell a broadcast text
///   bulk <group> <n>             draw n lines and report variety
///   seed <n>                     restart selection from a new seed
///   help                         list commands
///   quit                         exit

use creature_text::core::engine::{engine_from_dir, ChatRequest, CreatureTextEngine};
use creature_text::core::world::{Recipient, SessionDirectory, SpatialIndex, Speaker, WorldState};
use creature_text::schema::chat::{ChatKind, Locale, TextRange};
use creature_text::schema::entity::{Gender, Guid, Position, Team};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

struct PreviewNpc {
    template: u32,
    gender: Gender,
    emotes: RefCell<Vec<u32>>,
}

impl Speaker for PreviewNpc {
    fn guid(&self) -> Guid {
        Guid(0xF130_0000_0000_0000 | self.template as u64)
    }
    fn template_id(&self) -> u32 {
        self.template
    }
    fn name(&self, _locale: Locale) -> String {
        format!("Creature {}", self.template)
    }
    fn gender(&self) -> Gender {
        self.gender
    }
    fn position(&self) -> Position {
        Position::default()
    }
    fn map_id(&self) -> u32 {
        0
    }
    fn zone_id(&self) -> u32 {
        0
    }
    fn area_id(&self) -> u32 {
        0
    }
    fn play_emote(&self, emote: u32) {
        self.emotes.borrow_mut().push(emote);
    }
}

struct Listener {
    guid: Guid,
    locale: Locale,
    position: Position,
    received: RefCell<Vec<Vec<u8>>>,
}

impl Recipient for Listener {
    fn guid(&self) -> Guid {
        self.guid
    }
    fn locale(&self) -> Locale {
        self.locale
    }
    fn team(&self) -> Team {
        Team::Alliance
    }
    fn map_id(&self) -> u32 {
        0
    }
    fn zone_id(&self) -> u32 {
        0
    }
    fn area_id(&self) -> u32 {
        0
    }
    fn is_game_master(&self) -> bool {
        false
    }
    fn is_connected(&self) -> bool {
        true
    }
    fn deliver(&self, bytes: &[u8]) {
        self.received.borrow_mut().push(bytes.to_vec());
    }
}

#[derive(Default)]
struct Room {
    listeners: Vec<Listener>,
}

impl SessionDirectory for Room {
    fn find_connected(&self, guid: Guid) -> Option<&dyn Recipient> {
        self.listeners
            .iter()
            .find(|l| l.guid == guid)
            .map(|l| l as &dyn Recipient)
    }

    fn for_each_connected(&self, visitor: &mut dyn FnMut(&dyn Recipient)) {
        for l in &self.listeners {
            visitor(l as &dyn Recipient);
        }
    }

    fn for_each_on_map(&self, _map_id: u32, visitor: &mut dyn FnMut(&dyn Recipient)) {
        self.for_each_connected(visitor);
    }
}

impl SpatialIndex for Room {
    fn visit_within_radius(
        &self,
        _map_id: u32,
        origin: Position,
        radius: f32,
        visitor: &mut dyn FnMut(&dyn Recipient),
    ) {
        for l in self.listeners.iter().filter(|l| l.position.distance(&origin) <= radius) {
            visitor(l as &dyn Recipient);
        }
    }
}

impl Room {
    fn state(&self) -> WorldState<'_> {
        WorldState {
            sessions: self,
            spatial: self,
        }
    }

    fn drain(&self) -> Vec<(Guid, Locale, Vec<Vec<u8>>)> {
        self.listeners
            .iter()
            .map(|l| (l.guid, l.locale, l.received.borrow_mut().drain(..).collect()))
            .collect()
    }
}

fn main() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,creature_text=debug".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let data_dir = PathBuf::from(&args[1]);
    let mut seed = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().ok();
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(mut engine) = build_engine(&data_dir, seed) else {
        std::process::exit(1);
    };

    println!("Seed: {}", engine.config().seed);
    println!("Type 'help' for commands.\n");

    let mut npc = PreviewNpc {
        template: first_template(&engine).unwrap_or(0),
        gender: Gender::None,
        emotes: RefCell::new(Vec::new()),
    };
    let mut room = Room::default();
    let mut next_player: u64 = 1;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(cmd) = parts.first().map(|c| c.to_lowercase()) else {
            continue;
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => break,
            "help" | "h" | "?" => print_help(),
            "npc" => match parts.get(1).and_then(|s| s.parse().ok()) {
                Some(template) => {
                    npc.template = template;
                    println!("Speaking as creature {}", template);
                }
                None => println!("Usage: npc <template>"),
            },
            "gender" => match parts.get(1).and_then(|s| parse_gender(s)) {
                Some(gender) => {
                    npc.gender = gender;
                    println!("Creature {} speaks as {:?}", npc.template, gender);
                }
                None => println!("Usage: gender <male|female|none>"),
            },
            "groups" => {
                let groups = engine.tables().catalog.group_ids(npc.template);
                if groups.is_empty() {
                    println!("Creature {} has no text", npc.template);
                } else {
                    println!("Creature {} groups: {:?}", npc.template, groups);
                }
            }
            "player" => {
                let Some(locale) = parts.get(1).and_then(|s| Locale::from_code(s)) else {
                    println!("Usage: player <locale> [distance]   e.g. player deDE 10");
                    continue;
                };
                let distance: f32 = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(5.0);
                room.listeners.push(Listener {
                    guid: Guid(next_player),
                    locale,
                    position: Position::new(distance, 0.0, 0.0),
                    received: RefCell::new(Vec::new()),
                });
                println!("Player #{} ({}) at {} yards", next_player, locale.code(), distance);
                next_player += 1;
            }
            "say" => {
                let Some(group) = parts.get(1).and_then(|s| s.parse().ok()) else {
                    println!("Usage: say <group> [normal|area|zone|map|world]");
                    continue;
                };
                let range = parts.get(2).and_then(|s| parse_range(s)).unwrap_or_default();
                let request = ChatRequest::new().range(range);
                let duration = engine.send_chat(&npc, group, room.state(), &request);
                report(&engine, &npc, &room, duration);
            }
            "line" => {
                let (Some(group), Some(id)) = (
                    parts.get(1).and_then(|s| s.parse().ok()),
                    parts.get(2).and_then(|s| s.parse().ok()),
                ) else {
                    println!("Usage: line <group> <id>");
                    continue;
                };
                let duration =
                    engine.broadcast_entry_by_id(&npc, group, id, room.state(), &ChatRequest::new());
                println!("  text: {}", engine.localized_string(npc.template, group, id, npc.gender, Locale::DEFAULT));
                report(&engine, &npc, &room, duration);
            }
            "whisper" => {
                let (Some(group), Some(player)) = (
                    parts.get(1).and_then(|s| s.parse().ok()),
                    parts.get(2).and_then(|s| s.trim_start_matches('#').parse().ok()),
                ) else {
                    println!("Usage: whisper <group> <player#>");
                    continue;
                };
                let request = ChatRequest::new().whisper(Guid(player));
                let duration = engine.send_chat(&npc, group, room.state(), &request);
                report(&engine, &npc, &room, duration);
            }
            "broadcast" => {
                let Some(id) = parts.get(1).and_then(|s| s.parse().ok()) else {
                    println!("Usage: broadcast <id>");
                    continue;
                };
                let delivered = engine.send_broadcast_text(&npc, id, room.state(), &ChatRequest::new());
                println!("  delivered to {} listener(s)", delivered);
                room.drain();
            }
            "bulk" => {
                let (Some(group), Some(count)) = (
                    parts.get(1).and_then(|s| s.parse::<u8>().ok()),
                    parts.get(2).and_then(|s| s.parse::<usize>().ok()),
                ) else {
                    println!("Usage: bulk <group> <n>");
                    continue;
                };
                bulk(&mut engine, npc.template, npc.gender, group, count);
            }
            "seed" => match parts.get(1).and_then(|s| s.parse().ok()) {
                Some(s) => {
                    engine.reseed(s);
                    println!("Seed set to {}", s);
                }
                None => println!("Current seed: {}", engine.config().seed),
            },
            _ => println!("Unknown command: '{}'. Type 'help' for available commands.", cmd),
        }
    }
}

fn build_engine(dir: &Path, seed: Option<u64>) -> Option<CreatureTextEngine> {
    let mut engine = match engine_from_dir(dir) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "failed to load creature texts");
            return None;
        }
    };
    if let Some(seed) = seed {
        engine.reseed(seed);
    }
    info!(dir = %dir.display(), seed = engine.config().seed, "preview engine ready");
    Some(engine)
}

fn first_template(engine: &CreatureTextEngine) -> Option<u32> {
    engine.tables().catalog.entries().map(|e| e.template).min()
}

fn report(engine: &CreatureTextEngine, npc: &PreviewNpc, room: &Room, duration: u32) {
    for (guid, locale, messages) in room.drain() {
        for bytes in messages {
            let kind = bytes.first().and_then(|&id| ChatKind::from_wire_id(id));
            match kind {
                Some(kind) => println!("  {} ({}): {:?}, {} bytes", guid, locale.code(), kind, bytes.len()),
                None => println!("  {} ({}): unknown chat kind, {} bytes", guid, locale.code(), bytes.len()),
            }
        }
    }
    let emotes: Vec<u32> = npc.emotes.borrow_mut().drain(..).collect();
    if !emotes.is_empty() {
        println!("  emotes: {:?}", emotes);
    }
    println!("  duration: {} ms (seed {})", duration, engine.config().seed);
}

fn bulk(engine: &mut CreatureTextEngine, template: u32, gender: Gender, group: u8, count: usize) {
    let speaker = Guid(0xF130_0000_0000_0000 | template as u64);
    let mut counts: FxHashMap<u8, usize> = FxHashMap::default();
    let mut repeats = 0;
    let mut last = None;

    for _ in 0..count {
        let Some(entry) = engine.select_entry(speaker, template, group) else {
            println!("No lines in {}/{}", template, group);
            return;
        };
        if last == Some(entry.id) {
            repeats += 1;
        }
        last = Some(entry.id);
        *counts.entry(entry.id).or_insert(0) += 1;
    }

    println!("\n=== {} draws from {}/{} ===\n", count, template, group);
    let mut ids: Vec<(u8, usize)> = counts.into_iter().collect();
    ids.sort_by_key(|(id, _)| *id);
    for (id, n) in ids {
        let text = engine.localized_string(template, group, id, gender, Locale::DEFAULT);
        println!("  #{:<3} {:>6}  {:5.1}%  {}", id, n, n as f64 * 100.0 / count as f64, text);
    }
    println!("\nImmediate repeats: {}", repeats);
    engine.forget_speaker(speaker);
}

fn parse_gender(s: &str) -> Option<Gender> {
    match s.to_lowercase().as_str() {
        "male" | "m" => Some(Gender::Male),
        "female" | "f" => Some(Gender::Female),
        "none" | "n" => Some(Gender::None),
        _ => None,
    }
}

fn parse_range(s: &str) -> Option<TextRange> {
    match s.to_lowercase().as_str() {
        "normal" => Some(TextRange::Normal),
        "area" => Some(TextRange::Area),
        "zone" => Some(TextRange::Zone),
        "map" => Some(TextRange::Map),
        "world" => Some(TextRange::World),
        _ => None,
    }
}

fn print_usage() {
    println!("Preview: interactive shell for trying creature text tables.");
    println!();
    println!("Usage: preview <data_dir> [--seed <n>]");
    println!();
    println!("  <data_dir>   Directory with texts.ron and optional locales.ron,");
    println!("               broadcast_texts.ron and config.ron");
    println!("  --seed <n>   Override the configured RNG seed");
}

fn print_help() {
    println!("Commands:");
    println!("  npc <template>              Set the speaking creature");
    println!("  gender <male|female|none>   Set the creature's gender");
    println!("  groups                      List the creature's text groups");
    println!("  player <locale> [distance]  Add a listener (enUS, deDE, frFR, ...)");
    println!("  say <group> [range]         Select and send a line");
    println!("  line <group> <id>           Send a specific line");
    println!("  whisper <group> <player#>   Whisper a line to one listener");
    println!("  broadcast <id>              Yell a broadcast text");
    println!("  bulk <group> <n>            Draw n lines and report variety");
    println!("  seed <n>                    Restart selection from a new seed");
    println!("  help                        Show this help");
    println!("  quit                        Exit");
}

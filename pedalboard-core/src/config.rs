use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{DrumLibrary, Preset, PresetTable, RecordingSequence, Track};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    startup: StartupConfig,
    #[serde(default)]
    osc: OscConfig,
    #[serde(default)]
    ipc: IpcConfig,
    #[serde(default)]
    looper: LooperConfig,
    #[serde(default)]
    midi: MidiConfig,
    #[serde(default)]
    recorder: RecorderConfig,
    #[serde(default)]
    drums: DrumsConfig,
    presets: Option<Vec<Preset>>,
}

#[derive(Deserialize, Default)]
struct StartupConfig {
    require_sound_card: Option<bool>,
    sound_card: Option<String>,
    required_midi_clients: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct OscConfig {
    listen_port: Option<u16>,
}

#[derive(Deserialize, Default)]
struct IpcConfig {
    listen_addr: Option<String>,
}

#[derive(Deserialize, Default)]
struct LooperConfig {
    autostart: Option<bool>,
    program: Option<String>,
    host: Option<String>,
    osc_port: Option<u16>,
    feedback_port: Option<u16>,
    loop_count: Option<u32>,
    channels: Option<u32>,
    loop_time: Option<u32>,
    midi_binding: Option<String>,
    settle_ms: Option<u64>,
    connections: Option<Vec<Vec<String>>>,
}

#[derive(Deserialize, Default)]
struct MidiConfig {
    foot_controller: Option<String>,
    loop_hardware: Option<String>,
    send_program: Option<String>,
}

#[derive(Deserialize, Default)]
struct RecorderConfig {
    program: Option<String>,
    directory: Option<String>,
    source: Option<String>,
}

#[derive(Deserialize, Default)]
struct DrumsConfig {
    program: Option<String>,
    directory: Option<String>,
    tracks: Option<Vec<Track>>,
}

/// Fatal startup checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupSettings {
    pub require_sound_card: bool,
    /// Substring `aplay -l` must print.
    pub sound_card: String,
    /// ALSA sequencer clients that must be present.
    pub required_midi_clients: Vec<String>,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            require_sound_card: true,
            sound_card: "card 0:".to_string(),
            required_midi_clients: vec!["System".to_string(), "Midi Through".to_string()],
        }
    }
}

/// Loop engine launch and OSC addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooperSettings {
    pub autostart: bool,
    pub program: String,
    pub host: String,
    pub osc_port: u16,
    /// Port the engine's replies are sent back to.
    pub feedback_port: u16,
    pub loop_count: u32,
    pub channels: u32,
    pub loop_time: u32,
    pub midi_binding: String,
    pub settle: Duration,
    /// Commands run once the engine is up (audio/MIDI wiring).
    pub connections: Vec<Vec<String>>,
}

impl LooperSettings {
    pub fn engine_addr(&self) -> String {
        format!("{}:{}", self.host, self.osc_port)
    }
}

impl Default for LooperSettings {
    fn default() -> Self {
        Self {
            autostart: true,
            program: "sooperlooper".to_string(),
            host: "127.0.0.1".to_string(),
            osc_port: 9951,
            feedback_port: 9959,
            loop_count: 1,
            channels: 1,
            loop_time: 60,
            midi_binding: "sl_midi.slb".to_string(),
            settle: Duration::from_secs(3),
            connections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiSettings {
    /// Port-name prefix of the USB foot controller.
    pub foot_controller: String,
    /// Device-name substring of the loop switcher's MIDI interface.
    pub loop_hardware: String,
    pub send_program: String,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            foot_controller: "USBMIDI".to_string(),
            loop_hardware: "CH345".to_string(),
            send_program: "midisend".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderSettings {
    pub program: String,
    pub directory: PathBuf,
    /// JACK port recorded from.
    pub source: String,
}

impl RecorderSettings {
    pub fn sequence(&self) -> RecordingSequence {
        RecordingSequence::new(&self.directory)
    }
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            program: "jack_rec".to_string(),
            directory: PathBuf::from("recordings"),
            source: "sooperlooper:common_out_1".to_string(),
        }
    }
}

pub struct Config {
    startup: StartupConfig,
    osc: OscConfig,
    ipc: IpcConfig,
    looper: LooperConfig,
    midi: MidiConfig,
    recorder: RecorderConfig,
    drums: DrumsConfig,
    presets: Option<Vec<Preset>>,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            merge_user_file(&mut base, &path);
        }

        Self::from_file(base)
    }

    /// Embedded defaults overlaid with the file at `path` (if readable).
    pub fn load_from(path: &Path) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        merge_user_file(&mut base, path);
        Self::from_file(base)
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            startup: file.startup,
            osc: file.osc,
            ipc: file.ipc,
            looper: file.looper,
            midi: file.midi,
            recorder: file.recorder,
            drums: file.drums,
            presets: file.presets,
        }
    }

    pub fn startup(&self) -> StartupSettings {
        let fallback = StartupSettings::default();
        StartupSettings {
            require_sound_card: self
                .startup
                .require_sound_card
                .unwrap_or(fallback.require_sound_card),
            sound_card: self.startup.sound_card.clone().unwrap_or(fallback.sound_card),
            required_midi_clients: self
                .startup
                .required_midi_clients
                .clone()
                .unwrap_or(fallback.required_midi_clients),
        }
    }

    /// UDP port the OSC control listener binds.
    pub fn osc_listen_port(&self) -> u16 {
        self.osc.listen_port.unwrap_or(5005)
    }

    /// TCP address of the companion web server endpoint.
    pub fn ipc_listen_addr(&self) -> String {
        self.ipc
            .listen_addr
            .clone()
            .unwrap_or_else(|| "127.0.0.1:2400".to_string())
    }

    pub fn looper(&self) -> LooperSettings {
        let fallback = LooperSettings::default();
        LooperSettings {
            autostart: self.looper.autostart.unwrap_or(fallback.autostart),
            program: self.looper.program.clone().unwrap_or(fallback.program),
            host: self.looper.host.clone().unwrap_or(fallback.host),
            osc_port: self.looper.osc_port.unwrap_or(fallback.osc_port),
            feedback_port: self.looper.feedback_port.unwrap_or(fallback.feedback_port),
            loop_count: self.looper.loop_count.unwrap_or(fallback.loop_count),
            channels: self.looper.channels.unwrap_or(fallback.channels),
            loop_time: self.looper.loop_time.unwrap_or(fallback.loop_time),
            midi_binding: self
                .looper
                .midi_binding
                .clone()
                .unwrap_or(fallback.midi_binding),
            settle: self
                .looper
                .settle_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.settle),
            connections: self
                .looper
                .connections
                .clone()
                .unwrap_or(fallback.connections),
        }
    }

    pub fn midi(&self) -> MidiSettings {
        let fallback = MidiSettings::default();
        MidiSettings {
            foot_controller: self
                .midi
                .foot_controller
                .clone()
                .unwrap_or(fallback.foot_controller),
            loop_hardware: self
                .midi
                .loop_hardware
                .clone()
                .unwrap_or(fallback.loop_hardware),
            send_program: self
                .midi
                .send_program
                .clone()
                .unwrap_or(fallback.send_program),
        }
    }

    pub fn recorder(&self) -> RecorderSettings {
        let fallback = RecorderSettings::default();
        RecorderSettings {
            program: self.recorder.program.clone().unwrap_or(fallback.program),
            directory: self
                .recorder
                .directory
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or(fallback.directory),
            source: self.recorder.source.clone().unwrap_or(fallback.source),
        }
    }

    /// Program used to play drum/backing tracks.
    pub fn player_program(&self) -> String {
        self.drums
            .program
            .clone()
            .unwrap_or_else(|| "mplayer".to_string())
    }

    pub fn drum_library(&self) -> DrumLibrary {
        let fallback = DrumLibrary::default();
        let directory = self
            .drums
            .directory
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| fallback.directory().to_path_buf());
        let tracks = self
            .drums
            .tracks
            .clone()
            .unwrap_or_else(|| fallback.tracks().to_vec());
        DrumLibrary::new(directory, tracks)
    }

    /// Configured presets; an invalid table falls back to the built-in one.
    pub fn presets(&self) -> PresetTable {
        match &self.presets {
            Some(presets) => match PresetTable::new(presets.clone()) {
                Ok(table) => table,
                Err(e) => {
                    log::warn!(target: "config", "ignoring preset table: {}", e);
                    PresetTable::default()
                }
            },
            None => PresetTable::default(),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pedalboard").join("config.toml"))
}

fn merge_user_file(base: &mut ConfigFile, path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
            Ok(user) => merge(base, user),
            Err(e) => {
                log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
            }
        },
        Err(e) => {
            log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
        }
    }
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    merge_startup(&mut base.startup, user.startup);
    if user.osc.listen_port.is_some() {
        base.osc.listen_port = user.osc.listen_port;
    }
    if user.ipc.listen_addr.is_some() {
        base.ipc.listen_addr = user.ipc.listen_addr;
    }
    merge_looper(&mut base.looper, user.looper);
    merge_midi(&mut base.midi, user.midi);
    merge_recorder(&mut base.recorder, user.recorder);
    merge_drums(&mut base.drums, user.drums);
    if user.presets.is_some() {
        base.presets = user.presets;
    }
}

fn merge_startup(base: &mut StartupConfig, user: StartupConfig) {
    if user.require_sound_card.is_some() {
        base.require_sound_card = user.require_sound_card;
    }
    if user.sound_card.is_some() {
        base.sound_card = user.sound_card;
    }
    if user.required_midi_clients.is_some() {
        base.required_midi_clients = user.required_midi_clients;
    }
}

fn merge_looper(base: &mut LooperConfig, user: LooperConfig) {
    if user.autostart.is_some() {
        base.autostart = user.autostart;
    }
    if user.program.is_some() {
        base.program = user.program;
    }
    if user.host.is_some() {
        base.host = user.host;
    }
    if user.osc_port.is_some() {
        base.osc_port = user.osc_port;
    }
    if user.feedback_port.is_some() {
        base.feedback_port = user.feedback_port;
    }
    if user.loop_count.is_some() {
        base.loop_count = user.loop_count;
    }
    if user.channels.is_some() {
        base.channels = user.channels;
    }
    if user.loop_time.is_some() {
        base.loop_time = user.loop_time;
    }
    if user.midi_binding.is_some() {
        base.midi_binding = user.midi_binding;
    }
    if user.settle_ms.is_some() {
        base.settle_ms = user.settle_ms;
    }
    if user.connections.is_some() {
        base.connections = user.connections;
    }
}

fn merge_midi(base: &mut MidiConfig, user: MidiConfig) {
    if user.foot_controller.is_some() {
        base.foot_controller = user.foot_controller;
    }
    if user.loop_hardware.is_some() {
        base.loop_hardware = user.loop_hardware;
    }
    if user.send_program.is_some() {
        base.send_program = user.send_program;
    }
}

fn merge_recorder(base: &mut RecorderConfig, user: RecorderConfig) {
    if user.program.is_some() {
        base.program = user.program;
    }
    if user.directory.is_some() {
        base.directory = user.directory;
    }
    if user.source.is_some() {
        base.source = user.source;
    }
}

fn merge_drums(base: &mut DrumsConfig, user: DrumsConfig) {
    if user.program.is_some() {
        base.program = user.program;
    }
    if user.directory.is_some() {
        base.directory = user.directory;
    }
    if user.tracks.is_some() {
        base.tracks = user.tracks;
    }
}

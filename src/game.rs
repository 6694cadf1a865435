//! Game-mode state machine
//!
//! Owns the clock, the profile, the network link and (while playing) the
//! single world roster. One `update` call is one tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::consts::SCORE_PER_CREDIT;
use crate::net::{NetMessage, Network, Payload};
use crate::persistence::{SaveData, SaveStore};
use crate::sim::{
    Bullet, Controls, GameEvent, InputSnapshot, KeyBindings, RemotePlayer, SimClock, Upgrades,
    World, tick,
};
use crate::sim::wave::MAX_WAVE;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Menu,
    MultiplayerMenu,
    JoinGame,
    Shop,
    Playing,
    GameOver,
}

/// Discrete key presses that drive the menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Confirm,
    Cancel,
    Backspace,
    /// Typed character (address entry)
    Char(char),
}

/// Everything the input collaborator delivers for one tick
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Held keys and pointer, read by the ships
    pub snapshot: InputSnapshot,
    /// Presses since the last tick, read by the menus
    pub events: Vec<MenuKey>,
}

impl FrameInput {
    pub fn keys(events: &[MenuKey]) -> Self {
        Self {
            events: events.to_vec(),
            ..Default::default()
        }
    }
}

pub const MENU_OPTIONS: [&str; 7] = [
    "Single Player",
    "Local Co-op (2P)",
    "Local Co-op (3P)",
    "Local Co-op (4P)",
    "Online Multiplayer",
    "Shop",
    "Quit",
];

pub const MULTIPLAYER_OPTIONS: [&str; 3] = ["Host Game", "Join Game", "Back"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStat {
    Speed,
    Damage,
    FireRate,
    Health,
}

impl UpgradeStat {
    fn raise(self, upgrades: &mut Upgrades) {
        let level = match self {
            UpgradeStat::Speed => &mut upgrades.speed,
            UpgradeStat::Damage => &mut upgrades.damage,
            UpgradeStat::FireRate => &mut upgrades.fire_rate,
            UpgradeStat::Health => &mut upgrades.health,
        };
        *level += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    pub name: &'static str,
    pub cost: u64,
    pub stat: UpgradeStat,
}

pub const SHOP_ITEMS: [ShopItem; 4] = [
    ShopItem {
        name: "Speed +1",
        cost: 100,
        stat: UpgradeStat::Speed,
    },
    ShopItem {
        name: "Damage +1",
        cost: 150,
        stat: UpgradeStat::Damage,
    },
    ShopItem {
        name: "Fire Rate +1",
        cost: 200,
        stat: UpgradeStat::FireRate,
    },
    ShopItem {
        name: "Health +1",
        cost: 250,
        stat: UpgradeStat::Health,
    },
];

/// Which side of an online session we are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineRole {
    Host,
    Client,
}

/// Step a wrapping menu cursor
fn step_selection(selection: usize, len: usize, key: MenuKey) -> usize {
    match key {
        MenuKey::Up => (selection + len - 1) % len,
        MenuKey::Down => (selection + 1) % len,
        _ => selection,
    }
}

pub struct Game {
    config: Config,
    mode: Mode,
    clock: SimClock,
    save: SaveData,
    store: Box<dyn SaveStore>,
    network: Box<dyn Network>,
    bindings: [KeyBindings; KeyBindings::SLOTS],
    /// The one live roster, present while playing and on the game-over screen
    world: Option<World>,
    online: Option<OnlineRole>,
    /// Our id on the wire
    peer_id: u64,
    seed: u64,
    sessions_started: u64,
    menu_selection: usize,
    shop_selection: usize,
    join_address: String,
    quit_requested: bool,
    last_events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: Config, store: Box<dyn SaveStore>, network: Box<dyn Network>) -> Self {
        let save = store.load();
        let seed = config.resolve_seed();
        let peer_id = Pcg32::seed_from_u64(seed).random::<u64>();
        log::info!("Starting with {} credits", save.credits);

        Self {
            config,
            mode: Mode::Menu,
            clock: SimClock::new(),
            save,
            store,
            network,
            bindings: std::array::from_fn(KeyBindings::for_slot),
            world: None,
            online: None,
            peer_id,
            seed,
            sessions_started: 0,
            menu_selection: 0,
            shop_selection: 0,
            join_address: String::new(),
            quit_requested: false,
            last_events: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn credits(&self) -> u64 {
        self.save.credits
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn menu_selection(&self) -> usize {
        self.menu_selection
    }

    pub fn shop_selection(&self) -> usize {
        self.shop_selection
    }

    pub fn join_address(&self) -> &str {
        &self.join_address
    }

    pub fn online_role(&self) -> Option<OnlineRole> {
        self.online
    }

    pub fn peer_id(&self) -> u64 {
        self.peer_id
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Events produced by the most recent playing tick
    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    // === Tick ===

    /// Advance one tick and dispatch on the current mode
    pub fn update(&mut self, frame: &FrameInput) {
        self.clock.advance();
        self.last_events.clear();

        match self.mode {
            Mode::Menu => self.update_menu(&frame.events),
            Mode::MultiplayerMenu => self.update_multiplayer_menu(&frame.events),
            Mode::JoinGame => self.update_join_game(&frame.events),
            Mode::Shop => self.update_shop(&frame.events),
            Mode::Playing => self.update_playing(frame),
            Mode::GameOver => self.update_game_over(&frame.events),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::info!("Mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn back_to_menu(&mut self) {
        self.world = None;
        self.menu_selection = 0;
        self.set_mode(Mode::Menu);
    }

    fn update_menu(&mut self, events: &[MenuKey]) {
        for &key in events {
            match key {
                MenuKey::Up | MenuKey::Down => {
                    self.menu_selection = step_selection(self.menu_selection, MENU_OPTIONS.len(), key);
                }
                MenuKey::Confirm => {
                    match self.menu_selection {
                        0..=3 => self.start_session(self.menu_selection + 1, None),
                        4 => {
                            self.menu_selection = 0;
                            self.set_mode(Mode::MultiplayerMenu);
                        }
                        5 => {
                            self.shop_selection = 0;
                            self.set_mode(Mode::Shop);
                        }
                        _ => {
                            log::info!("Quit requested");
                            self.quit_requested = true;
                        }
                    }
                    return;
                }
                _ => {}
            }
        }
    }

    fn update_multiplayer_menu(&mut self, events: &[MenuKey]) {
        for &key in events {
            match key {
                MenuKey::Up | MenuKey::Down => {
                    self.menu_selection =
                        step_selection(self.menu_selection, MULTIPLAYER_OPTIONS.len(), key);
                }
                MenuKey::Confirm => match self.menu_selection {
                    0 => {
                        match self.network.host(self.config.port) {
                            Ok(()) => self.start_session(1, Some(OnlineRole::Host)),
                            Err(e) => log::warn!("Could not host: {e}"),
                        }
                        return;
                    }
                    1 => {
                        self.join_address.clear();
                        self.set_mode(Mode::JoinGame);
                        return;
                    }
                    _ => {
                        self.back_to_menu();
                        return;
                    }
                },
                MenuKey::Cancel => {
                    self.back_to_menu();
                    return;
                }
                _ => {}
            }
        }
    }

    fn update_join_game(&mut self, events: &[MenuKey]) {
        for &key in events {
            match key {
                MenuKey::Char(c) if c.is_ascii_digit() || c == '.' => self.join_address.push(c),
                MenuKey::Backspace => {
                    self.join_address.pop();
                }
                MenuKey::Cancel => {
                    self.menu_selection = 0;
                    self.set_mode(Mode::MultiplayerMenu);
                    return;
                }
                MenuKey::Confirm if !self.join_address.is_empty() => {
                    match self.network.join(&self.join_address, self.config.port) {
                        Ok(()) => {
                            self.start_session(1, Some(OnlineRole::Client));
                            return;
                        }
                        Err(e) => log::warn!("Could not join {}: {e}", self.join_address),
                    }
                }
                _ => {}
            }
        }
    }

    fn update_shop(&mut self, events: &[MenuKey]) {
        for &key in events {
            match key {
                MenuKey::Up | MenuKey::Down => {
                    self.shop_selection = step_selection(self.shop_selection, SHOP_ITEMS.len(), key);
                }
                MenuKey::Confirm => {
                    self.buy(self.shop_selection);
                }
                MenuKey::Cancel => {
                    self.back_to_menu();
                    return;
                }
                _ => {}
            }
        }
    }

    /// Buy a shop item if affordable. Returns whether the purchase happened.
    pub fn buy(&mut self, index: usize) -> bool {
        let Some(item) = SHOP_ITEMS.get(index) else {
            return false;
        };
        if self.save.credits < item.cost {
            log::debug!("Cannot afford {} ({} credits)", item.name, self.save.credits);
            return false;
        }

        self.save.credits -= item.cost;
        item.stat.raise(&mut self.save.upgrades);
        log::info!("Bought {} ({} credits left)", item.name, self.save.credits);
        self.store.save(&self.save);
        true
    }

    fn update_game_over(&mut self, events: &[MenuKey]) {
        if events.contains(&MenuKey::Confirm) {
            self.back_to_menu();
        }
    }

    // === Play session ===

    /// Build a fresh roster and enter wave 1
    pub fn start_session(&mut self, num_players: usize, online: Option<OnlineRole>) {
        let now = self.clock.now_ms();
        let seed = self.seed.wrapping_add(self.sessions_started);
        self.sessions_started += 1;

        let world = World::new(
            seed,
            self.config.field(),
            num_players,
            self.save.upgrades,
            now,
            self.config.max_particles,
        );
        log::info!(
            "Session started: {} player(s), seed {seed}, online {:?}",
            world.players.len(),
            online
        );
        self.world = Some(world);
        self.online = online;
        self.set_mode(Mode::Playing);

        if online == Some(OnlineRole::Host) {
            self.send(Payload::WaveSync { wave: 1 });
        }
    }

    fn update_playing(&mut self, frame: &FrameInput) {
        if frame.events.contains(&MenuKey::Cancel) {
            log::info!("Session abandoned");
            self.leave_online();
            self.back_to_menu();
            return;
        }

        let now = self.clock.now_ms();
        self.apply_inbound(now);

        let Some(world) = self.world.as_mut() else {
            self.back_to_menu();
            return;
        };

        let controls: Vec<Controls> = world
            .players
            .iter()
            .map(|p| {
                self.bindings[p.slot as usize % KeyBindings::SLOTS].controls(&frame.snapshot, p.pos)
            })
            .collect();
        let events = tick(world, &controls, now);
        let alive = world.any_player_alive();

        self.publish(&events);
        self.last_events.extend(events);

        if !alive {
            self.finish_session();
        }
    }

    /// Convert the roster's score into credits and show the summary
    fn finish_session(&mut self) {
        let total = self.world.as_ref().map_or(0, World::total_score);
        let earned = total / SCORE_PER_CREDIT;
        self.save.credits += earned;
        log::info!("Game over: score {total}, earned {earned} credits");
        self.store.save(&self.save);
        self.leave_online();
        self.set_mode(Mode::GameOver);
    }

    fn leave_online(&mut self) {
        if self.online.take().is_some() {
            self.send_raw(Payload::Goodbye);
            self.network.disconnect();
        }
    }

    // === Network ===

    fn send(&mut self, payload: Payload) {
        if self.online.is_some() {
            self.send_raw(payload);
        }
    }

    fn send_raw(&mut self, payload: Payload) {
        self.network.send(&NetMessage::new(self.peer_id, payload));
    }

    /// Push this tick's local state and shots to peers
    fn publish(&mut self, events: &[GameEvent]) {
        let Some(role) = self.online else {
            return;
        };

        let mut outbound = Vec::new();
        for event in events {
            match *event {
                GameEvent::ShotFired {
                    slot,
                    pos,
                    angle,
                    damage,
                } => outbound.push(Payload::Shot {
                    slot,
                    x: pos.x,
                    y: pos.y,
                    angle,
                    damage,
                }),
                GameEvent::WaveStarted { wave, .. } if role == OnlineRole::Host => {
                    outbound.push(Payload::WaveSync { wave });
                }
                _ => {}
            }
        }
        if let Some(world) = &self.world {
            outbound.extend(world.players.iter().filter(|p| p.is_alive()).map(|p| {
                Payload::PlayerState {
                    slot: p.slot,
                    x: p.pos.x,
                    y: p.pos.y,
                    angle: p.angle,
                    health: p.health,
                }
            }));
        }

        for payload in outbound {
            self.send_raw(payload);
        }
    }

    /// Fold peer messages into the world. Peers are trusted for what they
    /// report about themselves; nothing is reconciled.
    fn apply_inbound(&mut self, now: u64) {
        if self.online.is_none() {
            return;
        }
        let messages = self.network.receive();
        let Some(world) = self.world.as_mut() else {
            return;
        };

        for msg in messages {
            if msg.peer == self.peer_id {
                continue;
            }
            match msg.payload {
                Payload::PlayerState {
                    slot,
                    x,
                    y,
                    angle,
                    health,
                } => {
                    let pos = Vec2::new(x, y);
                    if !pos.is_finite() || !angle.is_finite() {
                        log::warn!("Ignoring non-finite state from peer {}", msg.peer);
                        continue;
                    }
                    world.upsert_remote(RemotePlayer {
                        peer: msg.peer,
                        slot,
                        pos: world.field.clamp_inset(pos, 0.0),
                        angle,
                        health,
                        last_seen: now,
                    });
                }
                Payload::Shot {
                    slot,
                    x,
                    y,
                    angle,
                    damage,
                } => {
                    let pos = Vec2::new(x, y);
                    if !pos.is_finite() || !angle.is_finite() {
                        log::warn!("Ignoring non-finite shot from peer {}", msg.peer);
                        continue;
                    }
                    world
                        .player_bullets
                        .push(Bullet::player(pos, angle, damage.max(0), slot));
                }
                Payload::WaveSync { wave } => {
                    if wave > MAX_WAVE {
                        log::warn!("Ignoring wave {wave} from peer {}", msg.peer);
                        continue;
                    }
                    if self.online == Some(OnlineRole::Client) && wave > world.wave() {
                        log::info!("Host is on wave {wave}, catching up");
                        let event = world.start_wave(wave, now);
                        self.last_events.push(event);
                    }
                }
                Payload::Goodbye => {
                    log::info!("Peer {} left", msg.peer);
                    world.drop_remote_peer(msg.peer);
                }
            }
        }
    }
}

//! 文字 CLI：读取 stdin → 解析命令 → 执行并打印

use bevy::app::AppExit;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::character::components::LocalPlayer;
use crate::character::events::FaceItem;
use crate::core::config::GameConfig;
use crate::core::{events::LogEvent, states::AppState};
use crate::data::{uuid_for, ItemCatalog};
use crate::equipment::components::{ActionBar, Hand};
use crate::equipment::events::{ConsumeHeldItem, SetActionSlotActive, UseHeldItem};
use crate::interaction::events::InteractTrigger;
use crate::interaction::facet::InteractableRegistry;
use crate::interaction::resolver::HoverState;
use crate::interaction::HoverPrompt;
use crate::inventory::components::InventoryOpen;
use crate::inventory::events::{
    DropRequested, DumpInventoryEvent, GiveItemEvent, ItemMoveRequested, ListInventoryEvent,
};
use crate::inventory::store::Inventory;
use crate::item::events::SpawnWorldItem;

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

const HELP: &str = "命令列表:
  help                   查看帮助
  status                 查看当前状态
  exit / quit            退出程序
  items [token]          列出物品，或按名称 / uuid 查询
  give <name> [count]    直接放进背包
  inv                    查看背包
  json                   背包 JSON 快照
  drop <slot>            丢弃该格一个物品
  move <from> <to>       拖动物品到另一格
  slot <n>               激活快捷栏第 n 格（1 起）
  spawn <name> [switch]  在面前生成物品
  face <name>            看向最近的同名物品
  e                      交互
  use                    使用手持物品
  consume                吃掉手持物品
  open                   开关背包";

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line in stdin.lock().lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Ok(mut buf) = buffer.lock() {
                        buf.push_back(line.to_string());
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令；排在输入阶段之前，当帧生效
            .add_systems(
                Update,
                execute_cli_commands
                    .after(read_stdin)
                    .before(crate::core::states::TickSet::Input)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
struct CliLine(String);

/// 我们支持的命令
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Status,
    Exit,
    Items(Option<String>), // None=全部；Some(token)=按 name/uuid 查询
    Give { name: String, count: u32 },
    Inventory,
    Json,
    Drop { slot: usize },
    Move { from: usize, to: usize },
    Slot { action: usize },
    Spawn { name: String, switch: bool },
    Face { name: String },
    Interact,
    Use,
    Consume,
    Open,
    Invalid(String),
    Unsupported(String),
}

/// 命令要发出去的事件
#[derive(SystemParam)]
struct CliWriters<'w> {
    app_exit: EventWriter<'w, AppExit>,
    log: EventWriter<'w, LogEvent>,
    give: EventWriter<'w, GiveItemEvent>,
    list: EventWriter<'w, ListInventoryEvent>,
    dump: EventWriter<'w, DumpInventoryEvent>,
    drop: EventWriter<'w, DropRequested>,
    moves: EventWriter<'w, ItemMoveRequested>,
    activate: EventWriter<'w, SetActionSlotActive>,
    spawn: EventWriter<'w, SpawnWorldItem>,
    face: EventWriter<'w, FaceItem>,
    interact: EventWriter<'w, InteractTrigger>,
    use_item: EventWriter<'w, UseHeldItem>,
    consume: EventWriter<'w, ConsumeHeldItem>,
}

/// 命令需要读的游戏状态
#[derive(SystemParam)]
struct GameView<'w, 's> {
    state: Res<'w, State<AppState>>,
    next: ResMut<'w, NextState<AppState>>,
    catalog: Res<'w, ItemCatalog>,
    config: Res<'w, GameConfig>,
    hover: Res<'w, HoverState>,
    registry: Res<'w, InteractableRegistry>,
    prompt: Res<'w, HoverPrompt>,
    open: ResMut<'w, InventoryOpen>,
    players: Query<
        'w,
        's,
        (&'static Inventory, &'static ActionBar, &'static Hand, &'static Transform),
        With<LocalPlayer>,
    >,
}

impl GameView<'_, '_> {
    /// 某格的 UI 代理
    fn proxy_at(&self, slot: usize) -> Result<Entity, String> {
        let (inventory, ..) = self.players.single().map_err(|_| "没有玩家".to_string())?;
        match inventory.slot(slot) {
            None => Err(format!("背包没有第 {slot} 格")),
            Some(record) => record.proxy.ok_or_else(|| format!("第 {slot} 格是空的")),
        }
    }
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let Ok(mut buffer) = CLI_BUFFER.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut out: CliWriters,
    mut view: GameView,
) {
    for CliLine(input) in line_reader.read() {
        match parse_command(input) {
            Command::Help => {
                out.log.write(LogEvent(HELP.into()));
            }

            Command::Status => {
                let held = view
                    .players
                    .single()
                    .ok()
                    .and_then(|(_, _, hand, _)| hand.held_name().map(str::to_string));
                let active = view
                    .players
                    .single()
                    .ok()
                    .and_then(|(_, bar, ..)| bar.active())
                    .map(|n| n + 1);
                let facets = view
                    .hover
                    .current()
                    .map(|target| view.registry.labels(target))
                    .unwrap_or_default();
                out.log.write(LogEvent(format!(
                    "State: {:?}, Items: {}, Hover: {:?} {:?} {:?}, Held: {:?}, Slot: {:?}, Open: {}",
                    view.state.get(),
                    view.catalog.items().len(),
                    view.hover.current(),
                    facets,
                    view.prompt.0,
                    held,
                    active,
                    view.open.0,
                )));
            }

            Command::Exit => {
                out.log.write(LogEvent("Bye~".into()));
                view.next.set(AppState::Shutdown);
                out.app_exit.write(AppExit::Success);
            }

            Command::Items(None) => {
                for def in view.catalog.items() {
                    let tag = if def.consumable { " (可食用)" } else { "" };
                    out.log.write(LogEvent(format!(
                        "{} | {}{tag} | {}",
                        uuid_for(&def.name),
                        def.name,
                        def.icon
                    )));
                }
            }

            Command::Items(Some(token)) => match view.catalog.find_loose(&token) {
                Some(def) => {
                    out.log.write(LogEvent(format!(
                        "==================================================
UUID       : {}
Name       : {}
Icon       : {}
Consumable : {}
==================================================",
                        uuid_for(&def.name),
                        def.name,
                        def.icon,
                        def.consumable
                    )));
                }
                None => {
                    out.log.write(LogEvent("未找到匹配物品".into()));
                }
            },

            Command::Give { name, count } => {
                out.give.write(GiveItemEvent { name, count });
            }

            Command::Inventory => {
                out.list.write(ListInventoryEvent);
            }

            Command::Json => {
                out.dump.write(DumpInventoryEvent);
            }

            Command::Drop { slot } => match view.proxy_at(slot) {
                Ok(proxy) => {
                    out.drop.write(DropRequested { proxy });
                }
                Err(msg) => {
                    out.log.write(LogEvent(msg));
                }
            },

            Command::Move { from, to } => match view.proxy_at(from) {
                Ok(proxy) => {
                    out.moves.write(ItemMoveRequested {
                        proxy,
                        destination: Some(to),
                    });
                }
                Err(msg) => {
                    out.log.write(LogEvent(msg));
                }
            },

            Command::Slot { action } => {
                out.activate.write(SetActionSlotActive { action });
            }

            Command::Spawn { name, switch } => {
                let at = view
                    .players
                    .single()
                    .map(|(.., transform)| {
                        transform.translation
                            + transform.forward() * view.config.interaction.ray_length * 0.5
                            + Vec3::Y
                    })
                    .unwrap_or(Vec3::Y);
                out.spawn.write(SpawnWorldItem { name, at, switch });
            }

            Command::Face { name } => {
                out.face.write(FaceItem { name });
            }

            Command::Interact => {
                out.interact.write(InteractTrigger);
            }

            Command::Use => {
                out.use_item.write(UseHeldItem);
            }

            Command::Consume => {
                out.consume.write(ConsumeHeldItem);
            }

            Command::Open => {
                view.open.0 = !view.open.0;
                out.log.write(LogEvent(format!(
                    "背包{}",
                    if view.open.0 { "已打开" } else { "已关闭" }
                )));
            }

            Command::Invalid(usage) => {
                out.log.write(LogEvent(format!("用法: {usage}")));
            }

            Command::Unsupported(cmd) => {
                out.log.write(LogEvent(format!("不支持的命令: {cmd}")));
            }
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "items" | "item" | "i" => {
            let token = parts.next().map(|s| s.to_string());
            Command::Items(token)
        }
        "give" => match parts.next() {
            Some(name) => {
                let count = parts.next().unwrap_or("1").parse().unwrap_or(1);
                Command::Give {
                    name: name.to_string(),
                    count,
                }
            }
            None => Command::Invalid("give <name> [count]".into()),
        },
        "inventory" | "inv" => Command::Inventory,
        "json" => Command::Json,
        "drop" => match number(&mut parts) {
            Some(slot) => Command::Drop { slot },
            None => Command::Invalid("drop <slot>".into()),
        },
        "move" | "mv" => match (number(&mut parts), number(&mut parts)) {
            (Some(from), Some(to)) => Command::Move { from, to },
            _ => Command::Invalid("move <from> <to>".into()),
        },
        "slot" => match number(&mut parts) {
            Some(n) if n >= 1 => Command::Slot { action: n - 1 },
            _ => Command::Invalid("slot <n>，n 从 1 开始".into()),
        },
        "spawn" => match parts.next() {
            Some(name) => Command::Spawn {
                name: name.to_string(),
                switch: parts.next() == Some("switch"),
            },
            None => Command::Invalid("spawn <name> [switch]".into()),
        },
        "face" | "look" => match parts.next() {
            Some(name) => Command::Face {
                name: name.to_string(),
            },
            None => Command::Invalid("face <name>".into()),
        },
        "e" | "interact" => Command::Interact,
        "use" | "u" => Command::Use,
        "consume" | "eat" => Command::Consume,
        "open" | "tab" => Command::Open,
        other => Command::Unsupported(other.into()),
    }
}

fn number<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<usize> {
    parts.next().and_then(|s| s.parse().ok())
}

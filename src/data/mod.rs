pub mod loader;
pub mod schema;

use bevy::prelude::*;
use schema::{ItemDefinition, ItemList, WorldSpawn};
use uuid::Uuid;

use crate::core::states::AppState;

// --------------------------- 资源 ---------------------------
#[derive(Resource, Default)]
pub struct ItemAssets {
    handle: Option<Handle<ItemList>>,
}

/// 物品目录：载入完成后从资产复制一份，按名字查
#[derive(Resource, Debug, Default, Clone)]
pub struct ItemCatalog {
    items: Vec<ItemDefinition>,
    spawns: Vec<WorldSpawn>,
}

impl ItemCatalog {
    pub fn new(items: Vec<ItemDefinition>) -> Self {
        Self {
            items,
            spawns: Vec::new(),
        }
    }

    pub fn from_list(list: &ItemList) -> Self {
        Self {
            items: list.items.clone(),
            spawns: list.spawns.clone(),
        }
    }

    /// 精确按名字查找（名字就是堆叠键）
    pub fn get(&self, name: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| item.name == name)
    }

    /// CLI 用：名字忽略大小写，或者 uuid
    pub fn find_loose(&self, token: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| {
            item.name.eq_ignore_ascii_case(token) || uuid_for(&item.name).to_string() == token
        })
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn spawns(&self) -> &[WorldSpawn] {
        &self.spawns
    }
}

/// 固定 namespace + 名字生成 v5 UUID，保证可重复得到同一值
pub fn uuid_for(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

// --------------------------- 插件 ---------------------------
pub struct DataPlugin;
impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app
            // 注册资产类型 & Loader
            .init_asset::<ItemList>()
            .register_asset_loader(loader::RonItemLoader)
            // 注册资源
            .init_resource::<ItemAssets>()
            .init_resource::<ItemCatalog>()
            // Loading 流程
            .add_systems(OnEnter(AppState::Loading), start_loading)
            .add_systems(Update, check_loaded.run_if(in_state(AppState::Loading)));
    }
}

// --------------------------- 系统 ---------------------------
fn start_loading(mut item_assets: ResMut<ItemAssets>, asset_server: Res<AssetServer>) {
    let handle: Handle<ItemList> = asset_server.load("data/items.ron");
    item_assets.handle = Some(handle);
}

fn check_loaded(
    mut next: ResMut<NextState<AppState>>,
    mut catalog: ResMut<ItemCatalog>,
    item_assets: Res<ItemAssets>,
    lists: Res<Assets<ItemList>>,
) {
    if let Some(h) = &item_assets.handle {
        if let Some(list) = lists.get(h) {
            *catalog = ItemCatalog::from_list(list);
            info!("✔ Items loaded: {}", list.items.len());
            next.set(AppState::InGame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog {
        ItemCatalog::new(vec![
            ItemDefinition {
                name: "Torch".into(),
                icon: "icons/torch.png".into(),
                consumable: false,
            },
            ItemDefinition {
                name: "Rock".into(),
                icon: "icons/rock.png".into(),
                consumable: false,
            },
        ])
    }

    #[test]
    fn exact_lookup_is_case_sensitive() {
        let catalog = catalog();
        assert!(catalog.get("Torch").is_some());
        assert!(catalog.get("torch").is_none());
    }

    #[test]
    fn loose_lookup_accepts_name_or_uuid() {
        let catalog = catalog();
        assert_eq!(catalog.find_loose("ROCK").unwrap().name, "Rock");
        let id = uuid_for("Torch").to_string();
        assert_eq!(catalog.find_loose(&id).unwrap().name, "Torch");
    }
}

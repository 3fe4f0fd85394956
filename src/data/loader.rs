use bevy::asset::{io::Reader, ron, AssetLoader, LoadContext};
use std::future::Future;
use thiserror::Error;

use super::schema::ItemList;

#[derive(Default)]
pub struct RonItemLoader;

#[derive(Debug, Error)]
pub enum RonItemLoaderError {
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Could not interpret bytes as UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Duplicate item name `{0}`")]
    DuplicateName(String),
}

impl AssetLoader for RonItemLoader {
    type Asset = ItemList;
    type Settings = ();
    type Error = RonItemLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext,
    ) -> impl Future<Output = Result<Self::Asset, Self::Error>> + Send {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;

            let s = std::str::from_utf8(&bytes)?;
            parse_item_list(s)
        }
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

/// 名字是堆叠键，表里不允许重名
pub fn parse_item_list(s: &str) -> Result<ItemList, RonItemLoaderError> {
    let list: ItemList = ron::de::from_str(s)?;
    for (i, item) in list.items.iter().enumerate() {
        if list.items[..i].iter().any(|other| other.name == item.name) {
            return Err(RonItemLoaderError::DuplicateName(item.name.clone()));
        }
    }
    Ok(list)
}

//! Persisted record types
//!
//! Plain data carried between the record store, the dispatch layer and the
//! HTTP surface. Field names double as column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{record_store::Record, tenant::StoreId};

/// Amount in minor currency units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

/// How a product's inventory is tracked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManageInventoryMethod {
    #[default]
    NoTrack,
    Track,
    External,
}

/// Hostname to store mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Host {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub name: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Host {
    pub fn new(name: impl Into<String>, store_id: StoreId) -> Self {
        Self {
            name: name.into(),
            store_id,
            ..Default::default()
        }
    }
}

/// A tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub id: StoreId,
    pub name: String,
    /// Application directory; defaults to `<apps_root>/<id>` when unset
    #[serde(default)]
    pub app_dir: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_app_dir(mut self, app_dir: impl Into<String>) -> Self {
        self.app_dir = Some(app_dir.into());
        self
    }
}

/// A named page of a store, rendered through `template_name`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub template_name: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(store_id: StoreId, name: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            store_id,
            name: name.into(),
            template_name: template_name.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// A store theme. At most one theme per store is the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Theme {
    pub fn new(store_id: StoreId, name: impl Into<String>) -> Self {
        Self {
            store_id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub url: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub attachment: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Free-form key/value attached to another record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub type_id: i64,
    pub parent_id: i64,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub resource_id: String,
    pub display_name: String,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    pub sku: String,
    #[serde(default)]
    pub sku_ex: String,
    pub resource_id: String,
    pub name: String,
    #[serde(default)]
    pub is_purchasable: bool,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub is_back_order_enabled: bool,
    #[serde(default)]
    pub is_pre_order_enabled: bool,
    #[serde(default)]
    pub is_shipping_address_required: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub list_price: Money,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub manage_inventory_method: ManageInventoryMethod,
    #[serde(default)]
    pub option_set_id: i64,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    #[serde(default)]
    pub id: i64,
    pub store_id: StoreId,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_purchasable: bool,
    #[serde(default)]
    pub is_visible: bool,
    #[serde(default)]
    pub is_back_order_enabled: bool,
    #[serde(default)]
    pub is_pre_order_enabled: bool,
    #[serde(default)]
    pub is_shipping_address_required: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub list_price: Money,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub manage_inventory_method: ManageInventoryMethod,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSet {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSetOption {
    #[serde(default)]
    pub id: i64,
    pub option_set_id: i64,
    pub option_id: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// A product option such as "Size" or "Color"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    #[serde(default)]
    pub id: i64,
    pub option_id: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Membership of a product in a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionProduct {
    #[serde(default)]
    pub id: i64,
    pub collection_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

macro_rules! impl_record {
    ($ty:ty, $table:literal, $message:literal) => {
        impl Record for $ty {
            const TABLE: &'static str = $table;
            const EXISTS_MESSAGE: &'static str = $message;

            fn set_id(&mut self, id: i64) {
                self.id = id.into();
            }

            fn stamp(&mut self, now: DateTime<Utc>) {
                self.created_at = now;
                self.updated_at = now;
            }
        }
    };
}

impl_record!(Host, "hosts", "host name was already existing.");
impl_record!(Store, "stores", "The store was already existing.");
impl_record!(Page, "pages", "page name was already existing.");
impl_record!(Theme, "themes", "theme name was already existing.");
impl_record!(Image, "images", "The image was already existing.");
impl_record!(CustomField, "custom_fields", "The custom Field was already existing.");
impl_record!(Collection, "collections", "The collection was already existing.");
impl_record!(Product, "products", "The product was already existing.");
impl_record!(Variation, "variations", "The variation was already existing.");
impl_record!(OptionSet, "option_sets", "The option set was already existing.");
impl_record!(
    OptionSetOption,
    "option_set_options",
    "The option set option was already existing."
);
impl_record!(ProductOption, "options", "The option was already existing.");
impl_record!(OptionValue, "option_values", "The option value was already existing.");
impl_record!(
    CollectionProduct,
    "collection_products",
    "The product was already in the collection."
);

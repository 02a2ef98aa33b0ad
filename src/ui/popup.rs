//! Popup menus anchored to a view
//!
//! The menu model is independent of any toolkit. Icon forcing is a
//! best-effort capability of the presenter behind the menu: when the
//! presenter does not offer it, or refuses, the menu is shown without icons.

use crate::types::{EquipmentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Menu resource id; zero or negative means "no resource"
pub type MenuRes = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl MenuItem {
    pub fn new(id: i32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    pub fn add(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Declarative menu definitions, keyed by resource id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuResources {
    menus: HashMap<MenuRes, Vec<MenuItem>>,
}

impl MenuResources {
    pub fn register(&mut self, res: MenuRes, items: Vec<MenuItem>) {
        self.menus.insert(res, items);
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append the items of `res` to `menu`
    pub fn inflate(&self, res: MenuRes, menu: &mut Menu) -> Result<()> {
        let items = self
            .menus
            .get(&res)
            .ok_or(EquipmentError::MenuNotFound(res))?;
        for item in items {
            menu.add(item.clone());
        }
        Ok(())
    }
}

/// The view a popup is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub view_id: String,
}

impl Anchor {
    pub fn new(view_id: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
        }
    }
}

/// Presenter capability that makes icons visible
pub trait ForceShowIcon {
    fn set_force_show_icon(&mut self, force: bool) -> Result<()>;
}

/// Whatever actually displays the popup
pub trait PopupPresenter: Send {
    /// The icon-forcing capability, when this presenter has one
    fn force_show_icon(&mut self) -> Option<&mut dyn ForceShowIcon> {
        None
    }

    /// Whether icons will be drawn
    fn shows_icons(&self) -> bool;
}

/// Default presenter: hides icons unless forced
#[derive(Debug, Default)]
pub struct StandardPresenter {
    force_icons: bool,
}

impl ForceShowIcon for StandardPresenter {
    fn set_force_show_icon(&mut self, force: bool) -> Result<()> {
        self.force_icons = force;
        Ok(())
    }
}

impl PopupPresenter for StandardPresenter {
    fn force_show_icon(&mut self) -> Option<&mut dyn ForceShowIcon> {
        Some(self)
    }

    fn shows_icons(&self) -> bool {
        self.force_icons
    }
}

/// Where menus come from and how they are presented
pub struct PopupContext {
    pub resources: MenuResources,
    presenter_factory: Box<dyn Fn() -> Box<dyn PopupPresenter> + Send + Sync>,
}

impl PopupContext {
    pub fn new(resources: MenuResources) -> Self {
        Self::with_presenter(resources, || {
            Box::new(StandardPresenter::default()) as Box<dyn PopupPresenter>
        })
    }

    pub fn with_presenter<F>(resources: MenuResources, factory: F) -> Self
    where
        F: Fn() -> Box<dyn PopupPresenter> + Send + Sync + 'static,
    {
        Self {
            resources,
            presenter_factory: Box::new(factory),
        }
    }
}

pub struct PopupMenu {
    anchor: Anchor,
    menu: Menu,
    presenter: Box<dyn PopupPresenter>,
}

impl PopupMenu {
    pub fn new(anchor: Anchor, presenter: Box<dyn PopupPresenter>) -> Self {
        Self {
            anchor,
            menu: Menu::default(),
            presenter,
        }
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    pub fn shows_icons(&self) -> bool {
        self.presenter.shows_icons()
    }

    /// One line per item, icon first when icons are shown
    pub fn render(&self) -> Vec<String> {
        let icons = self.shows_icons();
        self.menu
            .items()
            .iter()
            .map(|item| match (&item.icon, icons) {
                (Some(icon), true) => format!("[{}] {}", icon, item.title),
                _ => item.title.clone(),
            })
            .collect()
    }
}

impl fmt::Debug for PopupMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupMenu")
            .field("anchor", &self.anchor)
            .field("menu", &self.menu)
            .field("shows_icons", &self.shows_icons())
            .finish()
    }
}

/// Build a popup for `anchor`, inflating `menu_res` when it is positive
pub fn create_popup_menu(
    context: &PopupContext,
    anchor: Anchor,
    menu_res: MenuRes,
    enable_icons: bool,
) -> Result<PopupMenu> {
    let mut popup = PopupMenu::new(anchor, (context.presenter_factory)());

    if menu_res > 0 {
        context.resources.inflate(menu_res, popup.menu_mut())?;
    }

    if enable_icons {
        self::enable_icons(&mut popup);
    }

    Ok(popup)
}

/// Try to make the popup draw item icons. Never fails.
pub fn enable_icons(popup: &mut PopupMenu) {
    match popup.presenter.force_show_icon() {
        Some(capability) => match capability.set_force_show_icon(true) {
            Ok(()) => debug!("Forced icons on popup for {}", popup.anchor.view_id),
            Err(e) => warn!("Could not force popup icons: {}", e),
        },
        None => warn!("Popup presenter cannot force icons, showing without them"),
    }
}

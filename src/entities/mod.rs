pub mod addon_option;
pub mod cart;
pub mod cart_item;
pub mod cart_item_addon;
pub mod dining_table;
pub mod meat_option;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod order_item_addon;

// Re-export entities
pub use addon_option::{Entity as AddonOption, Model as AddonOptionModel};
pub use cart::{Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use cart_item_addon::{Entity as CartItemAddon, Model as CartItemAddonModel};
pub use dining_table::{Entity as DiningTable, Model as DiningTableModel, TableStatus};
pub use meat_option::{Entity as MeatOption, Model as MeatOptionModel};
pub use menu_item::{Entity as MenuItem, Model as MenuItemModel};
pub use order::{Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use order_item_addon::{Entity as OrderItemAddon, Model as OrderItemAddonModel};

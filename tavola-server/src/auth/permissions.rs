//! Permission Definitions
//!
//! 角色固定、权限固定的简化 RBAC：
//! - 每个 [`UserRole`] 对应一组不可配置的权限
//! - `admin` 拥有 `all`
//! - 顾客没有任何员工权限，只能访问自己的订单、预订和购物车

use shared::models::UserRole;

pub const MENU_MANAGE: &str = "menu:manage";
pub const ORDERS_READ_ALL: &str = "orders:read_all";
pub const ORDERS_UPDATE_STATUS: &str = "orders:update_status";
pub const ORDERS_MANAGE: &str = "orders:manage";
pub const RESERVATIONS_READ_ALL: &str = "reservations:read_all";
pub const RESERVATIONS_MANAGE: &str = "reservations:manage";
pub const TABLES_READ: &str = "tables:read";
pub const TABLES_MANAGE: &str = "tables:manage";
pub const INVENTORY_READ: &str = "inventory:read";
pub const INVENTORY_MANAGE: &str = "inventory:manage";
pub const SHIFTS_READ: &str = "shifts:read";
pub const SHIFTS_MANAGE: &str = "shifts:manage";
pub const USERS_MANAGE: &str = "users:manage";

/// Super permission held by admins
pub const ALL: &str = "all";

/// Every grantable permission
pub const ALL_PERMISSIONS: &[&str] = &[
    MENU_MANAGE,
    ORDERS_READ_ALL,
    ORDERS_UPDATE_STATUS,
    ORDERS_MANAGE,
    RESERVATIONS_READ_ALL,
    RESERVATIONS_MANAGE,
    TABLES_READ,
    TABLES_MANAGE,
    INVENTORY_READ,
    INVENTORY_MANAGE,
    SHIFTS_READ,
    SHIFTS_MANAGE,
    USERS_MANAGE,
];

const ADMIN_PERMISSIONS: &[&str] = &[ALL];

/// 经理：除用户管理外的全部权限
const MANAGER_PERMISSIONS: &[&str] = &[
    MENU_MANAGE,
    ORDERS_READ_ALL,
    ORDERS_UPDATE_STATUS,
    ORDERS_MANAGE,
    RESERVATIONS_READ_ALL,
    RESERVATIONS_MANAGE,
    TABLES_READ,
    TABLES_MANAGE,
    INVENTORY_READ,
    INVENTORY_MANAGE,
    SHIFTS_READ,
    SHIFTS_MANAGE,
];

/// 服务员：前厅
const WAITER_PERMISSIONS: &[&str] = &[
    ORDERS_READ_ALL,
    ORDERS_UPDATE_STATUS,
    RESERVATIONS_READ_ALL,
    RESERVATIONS_MANAGE,
    TABLES_READ,
];

/// 厨师：后厨
const CHEF_PERMISSIONS: &[&str] = &[ORDERS_READ_ALL, ORDERS_UPDATE_STATUS, INVENTORY_READ];

const CUSTOMER_PERMISSIONS: &[&str] = &[];

/// Get the fixed permission list of a role
pub fn permissions_for(role: UserRole) -> Vec<String> {
    let perms = match role {
        UserRole::Admin => ADMIN_PERMISSIONS,
        UserRole::Manager => MANAGER_PERMISSIONS,
        UserRole::Waiter => WAITER_PERMISSIONS,
        UserRole::Chef => CHEF_PERMISSIONS,
        UserRole::Customer => CUSTOMER_PERMISSIONS,
    };
    perms.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is known
pub fn is_valid_permission(permission: &str) -> bool {
    permission == ALL || ALL_PERMISSIONS.contains(&permission) || permission.ends_with(":*")
}

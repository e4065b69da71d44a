//! Constants shared across the client crates.

/// Default key of the persisted credential blob.
pub const AUTH_CRED: &str = "AUTH_CRED";
pub const SUPERADMIN: &str = "SUPERADMIN";

/// Roles allowed to use the admin surface.
pub const ALLOWED_ROLES: &[&str] = &[SUPERADMIN];

pub const AMENITIES: &[&str] = &[
    "AC",
    "Bed",
    "Dining Set",
    "Sofa",
    "TV",
    "Access Card",
    "Cupboard",
    "Refrigerator",
    "Stove",
    "Water Heater",
];

pub const FACILITIES: &[&str] = &[
    "ATM",
    "Function Room",
    "Gym",
    "Jogging Track",
    "Playground",
    "Security",
    "Tennis Court",
    "Basket Ball Court",
    "Grocery Store",
    "Internet & Cable TV",
    "Laundry",
    "Restaurant",
    "Swimming Pool",
];

/// REST endpoints, relative to the API base URL.
pub mod endpoints {
    pub const STATE: &str = "/state";
    pub const CITY: &str = "/city";
    pub const NEIGHBORHOOD: &str = "/neighborhood";
    pub const APARTMENTS: &str = "/apartments";
    pub const UNITS: &str = "/units";

    pub const OTP: &str = "/auth/otp";
    pub const LOGIN: &str = "/auth/login";
    pub const LOGOUT: &str = "/auth/logout";

    pub const MEDIA_UPLOAD: &str = "/media/upload-to-cloudinary";
    pub const MEDIA_SAVE_URL: &str = "/media/save-url";
}

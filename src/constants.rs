pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

pub const DEFAULT_ADMIN_USERNAME: &str = "parth";

pub mod session {

    pub const USER_KEY: &str = "user";

    pub const FLASH_KEY: &str = "_flashes";
}

pub mod routes {

    pub const HOME: &str = "/";

    pub const LOGIN: &str = "/login";

    pub const REGISTER: &str = "/register";

    pub const LOGOUT: &str = "/logout";

    pub const DASHBOARD: &str = "/items";

    pub const REPORT_LOST: &str = "/report/lost";

    pub const REPORT_FOUND: &str = "/report/found";

    pub const DELETE: &str = "/delete";

    pub const ADMIN: &str = "/admin";

    pub const EXPORT: &str = "/export";

    pub const UPLOADS: &str = "/static/uploads";
}

pub mod export {

    pub const HEADER: [&str; 6] = ["ID", "Title", "Description", "Location", "Type", "Status"];

    pub const DOWNLOAD_NAME: &str = "items.xlsx";

    pub const CONTENT_TYPE: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
}

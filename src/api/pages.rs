//! Server-rendered HTML. Every user-supplied string goes through
//! `html_escape` before it reaches the output.

use std::fmt::Write as _;

use axum::http::StatusCode;
use axum::response::Html;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::session::PageContext;
use super::validation::{MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, MAX_TITLE_LEN, MAX_USERNAME_LEN};
use crate::constants::routes;
use crate::db::{Item, User};
use crate::entities::items::ItemKind;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:0 auto;padding:1rem}\
nav a{margin-right:1rem}.flash{padding:.5rem;margin:.5rem 0;border-radius:4px}\
.flash.success{background:#e3f6e5}.flash.info{background:#e6eefb}.flash.error{background:#fbe6e6}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ccc;padding:.3rem}\
.item img{max-width:160px}form label{display:block;margin:.4rem 0}";

fn layout(title: &str, ctx: &PageContext, body: &str) -> Html<String> {
    let mut html = String::with_capacity(body.len() + 1024);
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{} | Lost &amp; Found</title><style>{STYLE}</style></head><body>",
        text(title)
    );

    html.push_str(&nav(ctx));

    for flash in &ctx.flashes {
        let _ = write!(
            html,
            "<div class=\"flash {}\">{}</div>",
            flash.level.as_str(),
            text(&flash.message)
        );
    }

    html.push_str("<main>");
    html.push_str(body);
    html.push_str("</main></body></html>");
    Html(html)
}

fn nav(ctx: &PageContext) -> String {
    let mut links = format!("<nav><a href=\"{}\">Home</a>", routes::HOME);

    match &ctx.identity {
        Some(identity) => {
            let _ = write!(
                links,
                "<a href=\"{}\">Report lost</a><a href=\"{}\">Report found</a>",
                routes::REPORT_LOST,
                routes::REPORT_FOUND
            );
            if identity.is_admin() {
                let _ = write!(links, "<a href=\"{}\">Admin</a>", routes::ADMIN);
            }
            let _ = write!(
                links,
                "<span>Signed in as {}</span> <a href=\"{}\">Logout</a>",
                text(&identity.username),
                routes::LOGOUT
            );
        }
        None => {
            let _ = write!(
                links,
                "<a href=\"{}\">Login</a><a href=\"{}\">Register</a>",
                routes::LOGIN,
                routes::REGISTER
            );
        }
    }

    links.push_str("</nav>");
    links
}

fn image_tag(image: Option<&str>) -> String {
    image.map_or_else(String::new, |name| {
        format!(
            "<img src=\"{}/{}\" alt=\"{}\">",
            routes::UPLOADS,
            attr(name),
            attr(name)
        )
    })
}

pub fn index(ctx: &PageContext, items: &[Item]) -> Html<String> {
    let mut body = String::from("<h1>Lost &amp; Found</h1>");

    if items.is_empty() {
        body.push_str("<p>No items have been reported yet.</p>");
    }

    for item in items {
        let _ = write!(
            body,
            "<article class=\"item\"><h2>[{}] {}</h2><p>{}</p>\
             <p><strong>Location:</strong> {}</p><p><strong>Status:</strong> {}</p>{}</article>",
            item.kind.as_str(),
            text(&item.title),
            text(&item.description),
            text(&item.location),
            item.status.as_str(),
            image_tag(item.image.as_deref())
        );
    }

    layout("Home", ctx, &body)
}

fn credentials_form(heading: &str, action: &str, submit: &str) -> String {
    format!(
        "<h1>{heading}</h1><form method=\"post\" action=\"{action}\">\
         <label>Username <input name=\"username\" maxlength=\"{MAX_USERNAME_LEN}\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <button type=\"submit\">{submit}</button></form>"
    )
}

pub fn register(ctx: &PageContext) -> Html<String> {
    let body = credentials_form("Create an account", routes::REGISTER, "Register");
    layout("Register", ctx, &body)
}

pub fn login(ctx: &PageContext) -> Html<String> {
    let body = credentials_form("Sign in", routes::LOGIN, "Login");
    layout("Login", ctx, &body)
}

pub fn report(ctx: &PageContext, kind: ItemKind) -> Html<String> {
    let (heading, action) = match kind {
        ItemKind::Lost => ("Report a lost item", routes::REPORT_LOST),
        ItemKind::Found => ("Report a found item", routes::REPORT_FOUND),
    };

    let body = format!(
        "<h1>{heading}</h1>\
         <form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\
         <label>Title <input name=\"title\" maxlength=\"{MAX_TITLE_LEN}\" required></label>\
         <label>Description <textarea name=\"description\" maxlength=\"{MAX_DESCRIPTION_LEN}\"></textarea></label>\
         <label>Location <input name=\"location\" maxlength=\"{MAX_LOCATION_LEN}\"></label>\
         <label>Image <input name=\"image\" type=\"file\" accept=\".png,.jpg,.jpeg,.gif\"></label>\
         <button type=\"submit\">Submit</button></form>"
    );

    layout(heading, ctx, &body)
}

pub fn admin(ctx: &PageContext, users: &[User], items: &[Item]) -> Html<String> {
    let mut body = format!(
        "<h1>Admin panel</h1><p><a href=\"{}\">Export items to Excel</a></p>\
         <h2>Users</h2><table><tr><th>ID</th><th>Username</th><th>Role</th></tr>",
        routes::EXPORT
    );

    for user in users {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            user.id,
            text(&user.username),
            user.role.as_str()
        );
    }

    body.push_str(
        "</table><h2>Items</h2><table><tr><th>ID</th><th>Title</th><th>Description</th>\
         <th>Location</th><th>Type</th><th>Status</th><th>Image</th><th></th></tr>",
    );

    for item in items {
        let _ = write!(
            body,
            "<tr class=\"item\"><td>{id}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td><a href=\"{}/{id}\">Delete</a></td></tr>",
            text(&item.title),
            text(&item.description),
            text(&item.location),
            item.kind.as_str(),
            item.status.as_str(),
            image_tag(item.image.as_deref()),
            routes::DELETE,
            id = item.id,
        );
    }

    body.push_str("</table>");
    layout("Admin", ctx, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        "<h1>{}</h1><p>{}</p><p><a href=\"{}\">Back to home</a></p>",
        status.as_u16(),
        text(message),
        routes::HOME
    );
    layout("Error", &PageContext::default(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::{Flash, FlashLevel};
    use crate::domain::Identity;
    use crate::entities::items::ItemStatus;
    use crate::entities::users::Role;

    fn item(title: &str, image: Option<&str>) -> Item {
        Item {
            id: 1,
            title: title.to_string(),
            description: String::new(),
            location: "Library".to_string(),
            kind: ItemKind::Found,
            image: image.map(str::to_string),
            status: ItemStatus::Pending,
            created_at: String::new(),
        }
    }

    #[test]
    fn user_text_is_escaped() {
        let Html(html) = index(&PageContext::default(), &[item("<script>x</script>", None)]);
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>x"));
    }

    #[test]
    fn flashes_are_rendered() {
        let ctx = PageContext {
            identity: None,
            flashes: vec![Flash {
                level: FlashLevel::Error,
                message: "Invalid credentials".to_string(),
            }],
        };
        let Html(html) = login(&ctx);
        assert!(html.contains("<div class=\"flash error\">Invalid credentials</div>"));
    }

    #[test]
    fn nav_reflects_identity() {
        let Html(anonymous) = index(&PageContext::default(), &[]);
        assert!(anonymous.contains("href=\"/login\""));
        assert!(!anonymous.contains("href=\"/admin\""));

        let ctx = PageContext {
            identity: Some(Identity {
                username: "parth".to_string(),
                role: Role::Admin,
            }),
            flashes: Vec::new(),
        };
        let Html(admin) = index(&ctx, &[]);
        assert!(admin.contains("href=\"/admin\""));
        assert!(admin.contains("href=\"/logout\""));
    }

    #[test]
    fn image_links_to_upload_directory() {
        let Html(html) = index(&PageContext::default(), &[item("Keys", Some("keys.png"))]);
        assert!(html.contains("src=\"/static/uploads/keys.png\""));
    }
}

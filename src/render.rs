use crate::models::Listing;

/// Listing Renderer / HTML pages.
///
/// Server-rendered pages for the whole surface: login, registration, and the
/// index page with its three entry forms and three listing tables. Rendering
/// is plain string formatting; every user-supplied value passes through
/// `escape` before it reaches the page.

/// escape
///
/// Minimal HTML entity escaping for text interpolated into pages.
pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// page
///
/// The common document shell.
fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body style=\"font-family:sans-serif;max-width:900px;margin:30px auto;\">\n{body}\n</body></html>"
    )
}

/// status_line
///
/// The inline status message shown after a form submission. Empty when there
/// is nothing to report.
fn status_line(message: Option<&str>) -> String {
    match message {
        Some(msg) => format!("<p><strong>{}</strong></p>", escape(msg)),
        None => String::new(),
    }
}

/// login_page
///
/// The login form, with an optional inline status line above it. The field
/// names (`usuario`, `contrasena`) are part of the external interface.
pub fn login_page(message: Option<&str>) -> String {
    let body = format!(
        "{status}\
         <h2>Sign in</h2>\n\
         <form method=\"POST\" action=\"/login\">\n\
         <label>Username:</label><br><input type=\"text\" name=\"usuario\"><br>\n\
         <label>Password:</label><br><input type=\"password\" name=\"contrasena\"><br>\n\
         <button type=\"submit\">Sign in</button>\n\
         </form>\n\
         <p>No account yet? <a href=\"/register\">Register</a></p>",
        status = status_line(message),
    );
    page("Sign in", &body)
}

/// register_page
///
/// The self-registration form, with an optional inline status line.
pub fn register_page(message: Option<&str>) -> String {
    let body = format!(
        "{status}\
         <h2>Register</h2>\n\
         <form method=\"POST\" action=\"/register\">\n\
         <label>Username:</label><br><input type=\"text\" name=\"username\"><br>\n\
         <label>Password:</label><br><input type=\"password\" name=\"password\"><br>\n\
         <label>Repeat password:</label><br><input type=\"password\" name=\"password2\"><br>\n\
         <button type=\"submit\">Register</button>\n\
         </form>\n\
         <p>Already have an account? <a href=\"/login\">Sign in</a></p>",
        status = status_line(message),
    );
    page("Register", &body)
}

/// register_success_page
pub fn register_success_page() -> String {
    page(
        "Register",
        "<h3>Registration successful. You can now sign in.</h3><a href=\"/login\">Go to login</a>",
    )
}

/// entry_forms
///
/// The three record entry forms. Each carries a hidden `tipo` discriminator
/// selecting the target entity.
fn entry_forms() -> String {
    "<h2>Add Student</h2>\n\
     <form method=\"POST\" action=\"/\">\n\
     <input type=\"hidden\" name=\"tipo\" value=\"estudiante\">\n\
     Name: <input type=\"text\" name=\"nombre\"><br>\n\
     Email: <input type=\"email\" name=\"correo\"><br>\n\
     <input type=\"submit\" value=\"Add Student\">\n\
     </form>\n\
     <h2>Add Course</h2>\n\
     <form method=\"POST\" action=\"/\">\n\
     <input type=\"hidden\" name=\"tipo\" value=\"curso\">\n\
     Title: <input type=\"text\" name=\"titulo\"><br>\n\
     Description: <input type=\"text\" name=\"descripcion\"><br>\n\
     <input type=\"submit\" value=\"Add Course\">\n\
     </form>\n\
     <h2>Add Enrollment</h2>\n\
     <form method=\"POST\" action=\"/\">\n\
     <input type=\"hidden\" name=\"tipo\" value=\"inscripcion\">\n\
     Student ID: <input type=\"number\" name=\"estudiante_id\"><br>\n\
     Course ID: <input type=\"number\" name=\"curso_id\"><br>\n\
     <input type=\"submit\" value=\"Add Enrollment\">\n\
     </form>"
        .to_string()
}

/// listing_tables
///
/// The three full-table listings, ordered as the repository returned them.
fn listing_tables(listing: &Listing) -> String {
    let mut students = String::from(
        "<h3>Students</h3><table border=\"1\"><tr><th>ID</th><th>Name</th><th>Email</th></tr>",
    );
    for s in &listing.students {
        students.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            s.id,
            escape(&s.name),
            escape(&s.email)
        ));
    }
    students.push_str("</table>");

    let mut courses = String::from(
        "<h3>Courses</h3><table border=\"1\"><tr><th>ID</th><th>Title</th><th>Description</th></tr>",
    );
    for c in &listing.courses {
        courses.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            c.id,
            escape(&c.title),
            escape(c.description.as_deref().unwrap_or(""))
        ));
    }
    courses.push_str("</table>");

    let mut enrollments = String::from(
        "<h3>Enrollments</h3><table border=\"1\"><tr><th>ID</th><th>Student ID</th><th>Course ID</th><th>Date</th></tr>",
    );
    for e in &listing.enrollments {
        enrollments.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            e.id, e.student_id, e.course_id, e.enrollment_date
        ));
    }
    enrollments.push_str("</table>");

    format!("{students}<br>{courses}<br>{enrollments}")
}

/// index_page
///
/// The protected main page: greeting and logout link, the status line from
/// the latest submission (if any), the entry forms, and the full listing.
pub fn index_page(username: &str, message: Option<&str>, listing: &Listing) -> String {
    let body = format!(
        "<div><span>Signed in as <strong>{user}</strong></span> | \
         <a href=\"/register\">Register new user</a> | \
         <a href=\"/logout\">Sign out</a></div>\n\
         {status}{forms}<br>{tables}",
        user = escape(username),
        status = status_line(message),
        forms = entry_forms(),
        tables = listing_tables(listing),
    );
    page("Enrollment Portal", &body)
}

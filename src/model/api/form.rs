use serde::Serialize;

/// Describes the fields a client must submit to a form endpoint.
/// Served by the `GET` half of each form route in place of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormDescription {
    pub form: &'static str,
    pub submit_to: &'static str,
    pub fields: &'static [&'static str],
}

pub const SIGNUP_FORM: FormDescription = FormDescription {
    form: "signup",
    submit_to: "/signup",
    fields: &[
        "name",
        "age",
        "email",
        "mobile",
        "address",
        "national_id",
        "password",
    ],
};

pub const LOGIN_FORM: FormDescription = FormDescription {
    form: "login",
    submit_to: "/login",
    fields: &["national_id", "password", "role"],
};

pub const CHANGE_PASSWORD_FORM: FormDescription = FormDescription {
    form: "change-password",
    submit_to: "/change-password",
    fields: &["current_password", "new_password"],
};

pub const ADD_CANDIDATE_FORM: FormDescription = FormDescription {
    form: "add-candidate",
    submit_to: "/add",
    fields: &["name", "party", "age"],
};

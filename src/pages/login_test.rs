use super::*;

#[test]
fn register_form_converts_all_fields() {
    let form = RegisterForm { username: "alice".to_owned(), email: "a@example.test".to_owned(), password: "pw".to_owned() };
    let registration = Registration::from(&form);
    assert_eq!(registration.email, "a@example.test");
    assert_eq!(registration.credentials().username, "alice");
    assert_eq!(registration.credentials().password, "pw");
}

#[test]
fn field_groups_do_not_overlap() {
    assert!(LOGIN_FIELDS.iter().all(|f| !REGISTER_FIELDS.contains(f)));
}

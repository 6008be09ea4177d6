mod app {
    mod session_tests;
    mod submit_tests;
    mod validation_tests;
}

mod form {
    mod answers_tests;
    mod draft_tests;
    mod edit_tests;
    mod section_tests;
    mod visibility_tests;
}

mod presentation {
    mod fields_tests;
}

mod schema {
    mod normalize_tests;
}

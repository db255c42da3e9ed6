#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(String, i32)>, String, Option<bool>)| {
    let mut router = velo_router::Router::new();

    for (route, item) in data.0 {
        // Conflicting routes are expected; the tree just has to stay sound.
        let _ = router.insert("GET", route, item);
    }

    match data.2 {
        None => {
            let _ = router.at("GET", &data.1);
        }
        Some(fix_trailing_slash) => {
            let _ = router.fix_path("GET", &data.1, fix_trailing_slash);
        }
    }
});

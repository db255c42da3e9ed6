use velo_router::{MatchError, Router};

#[allow(clippy::type_complexity)]
struct MatchTest {
    routes: Vec<&'static str>,
    matches: Vec<(
        &'static str,
        &'static str,
        Result<Vec<(&'static str, &'static str)>, MatchError>,
    )>,
}

impl MatchTest {
    fn run(self) {
        let mut router = Router::new();

        for route in self.routes {
            assert_eq!(router.insert("GET", route, route.to_owned()), Ok(()), "{route}");
        }

        router.check_priorities().unwrap();

        for (path, pattern, expected) in self.matches {
            match router.at("GET", path) {
                Ok(matched) => {
                    assert_eq!(matched.value, pattern, "{path}");
                    assert_eq!(matched.pattern, pattern, "{path}");

                    let got = matched.params.iter().collect::<Vec<_>>();
                    match expected {
                        Ok(params) => assert_eq!(params, got, "{path}"),
                        Err(err) => panic!("expected {err} for {path}"),
                    }
                }
                Err(err) => assert_eq!(expected, Err(err), "{path}"),
            }
        }
    }
}

macro_rules! p {
    ($($k:expr => $v:expr),* $(,)?) => {
        Ok(vec![$(($k, $v)),*])
    };
}

#[test]
fn statics() {
    MatchTest {
        routes: vec![
            "/hi",
            "/contact",
            "/co",
            "/c",
            "/a",
            "/ab",
            "/doc/",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/α",
            "/β",
        ],
        matches: vec![
            ("/a", "/a", p! {}),
            ("/", "", Err(MatchError::NotFound)),
            ("/hi", "/hi", p! {}),
            ("/contact", "/contact", p! {}),
            ("/co", "/co", p! {}),
            ("/con", "", Err(MatchError::NotFound)),
            ("/cona", "", Err(MatchError::NotFound)),
            ("/no", "", Err(MatchError::NotFound)),
            ("/ab", "/ab", p! {}),
            ("/doc/", "/doc/", p! {}),
            ("/doc/go_faq.html", "/doc/go_faq.html", p! {}),
            ("/α", "/α", p! {}),
            ("/β", "/β", p! {}),
        ],
    }
    .run()
}

#[test]
fn wildcards() {
    MatchTest {
        routes: vec![
            "/",
            "/cmd/:tool/:sub",
            "/src/*filepath",
            "/search/",
            "/search/:query",
            "/user_:name",
            "/user_:name/about",
            "/files/:dir/*filepath",
            "/doc/",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/info/:user/public",
            "/info/:user/project/:project",
        ],
        matches: vec![
            ("/", "/", p! {}),
            ("/cmd/test/", "", Err(MatchError::ExtraTrailingSlash)),
            ("/cmd/test", "", Err(MatchError::NotFound)),
            (
                "/cmd/test/3",
                "/cmd/:tool/:sub",
                p! { "tool" => "test", "sub" => "3" },
            ),
            ("/src/", "/src/*filepath", p! { "filepath" => "" }),
            (
                "/src/some/file.png",
                "/src/*filepath",
                p! { "filepath" => "some/file.png" },
            ),
            ("/search/", "/search/", p! {}),
            (
                "/search/someth!ng+in+ünìcodé",
                "/search/:query",
                p! { "query" => "someth!ng+in+ünìcodé" },
            ),
            (
                "/search/someth!ng+in+ünìcodé/",
                "",
                Err(MatchError::ExtraTrailingSlash),
            ),
            ("/user_gopher", "/user_:name", p! { "name" => "gopher" }),
            (
                "/user_gopher/about",
                "/user_:name/about",
                p! { "name" => "gopher" },
            ),
            (
                "/files/js/inc/framework.js",
                "/files/:dir/*filepath",
                p! { "dir" => "js", "filepath" => "inc/framework.js" },
            ),
            (
                "/info/gordon/public",
                "/info/:user/public",
                p! { "user" => "gordon" },
            ),
            (
                "/info/gordon/project/go",
                "/info/:user/project/:project",
                p! { "user" => "gordon", "project" => "go" },
            ),
        ],
    }
    .run()
}

// The catch-all value never includes the slash separating it from the
// static prefix.
#[test]
fn catch_all_excludes_separator() {
    MatchTest {
        routes: vec!["/static/*filepath"],
        matches: vec![
            (
                "/static/a/b/c.txt",
                "/static/*filepath",
                p! { "filepath" => "a/b/c.txt" },
            ),
            ("/static/x", "/static/*filepath", p! { "filepath" => "x" }),
            ("/static/", "/static/*filepath", p! { "filepath" => "" }),
            ("/static", "", Err(MatchError::MissingTrailingSlash)),
        ],
    }
    .run()
}

#[test]
fn trailing_slash_hints() {
    MatchTest {
        routes: vec![
            "/hi",
            "/b/",
            "/search/:query",
            "/cmd/:tool/",
            "/src/*filepath",
            "/x",
            "/x/y",
            "/y/",
            "/y/z",
            "/0/:id",
            "/0/:id/1",
            "/1/:id/",
            "/1/:id/2",
            "/aa",
            "/a/",
            "/admin",
            "/admin/:category",
            "/admin/:category/:page",
            "/doc",
            "/doc/go_faq.html",
            "/doc/go1.html",
            "/no/a",
            "/no/b",
            "/api/hello/:name",
        ],
        matches: vec![
            ("/hi/", "", Err(MatchError::ExtraTrailingSlash)),
            ("/b", "", Err(MatchError::MissingTrailingSlash)),
            ("/search/gopher/", "", Err(MatchError::ExtraTrailingSlash)),
            ("/cmd/vet", "", Err(MatchError::MissingTrailingSlash)),
            ("/src", "", Err(MatchError::MissingTrailingSlash)),
            ("/x/", "", Err(MatchError::ExtraTrailingSlash)),
            ("/y", "", Err(MatchError::MissingTrailingSlash)),
            ("/0/go/", "", Err(MatchError::ExtraTrailingSlash)),
            ("/1/go", "", Err(MatchError::MissingTrailingSlash)),
            ("/a", "", Err(MatchError::MissingTrailingSlash)),
            ("/admin/", "", Err(MatchError::ExtraTrailingSlash)),
            ("/admin/config/", "", Err(MatchError::ExtraTrailingSlash)),
            (
                "/admin/config/permissions/",
                "",
                Err(MatchError::ExtraTrailingSlash),
            ),
            ("/doc/", "", Err(MatchError::ExtraTrailingSlash)),
            // No fixable route exists for these.
            ("/", "", Err(MatchError::NotFound)),
            ("/no", "", Err(MatchError::NotFound)),
            ("/no/", "", Err(MatchError::NotFound)),
            ("/_", "", Err(MatchError::NotFound)),
            ("/_/", "", Err(MatchError::NotFound)),
            ("/api/world/abc", "", Err(MatchError::NotFound)),
        ],
    }
    .run()
}

// Sibling probing order depends on registration counts, never on
// registration order.
#[test]
fn insertion_order_invariance() {
    let routes = [
        "/",
        "/users/:id",
        "/users/:id/posts",
        "/static/*path",
        "/health",
        "/healthz",
        "/heap",
    ];

    let mut forward = Router::new();
    for route in routes {
        forward.insert("GET", route, route).unwrap();
    }

    let mut backward = Router::new();
    for route in routes.iter().rev() {
        backward.insert("GET", *route, *route).unwrap();
    }

    forward.check_priorities().unwrap();
    backward.check_priorities().unwrap();

    for path in [
        "/",
        "/users/42",
        "/users/42/posts",
        "/static/css/main.css",
        "/health",
        "/healthz",
        "/heap",
        "/missing",
    ] {
        let a = forward.at("GET", path).map(|m| *m.value);
        let b = backward.at("GET", path).map(|m| *m.value);
        assert_eq!(a, b, "{path}");
    }
}

// Lookups never mutate the tree; repeating one yields the same answer.
#[test]
fn repeated_lookups() {
    let mut router = Router::new();
    router.insert("GET", "/users/:id", "user").unwrap();

    for _ in 0..3 {
        let matched = router.at("GET", "/users/7").unwrap();
        assert_eq!(*matched.value, "user");
        assert_eq!(matched.params.get("id"), Some("7"));

        assert_eq!(
            router.at("GET", "/users/7/").unwrap_err(),
            MatchError::ExtraTrailingSlash
        );
    }
}

#[test]
fn unknown_method() {
    let mut router = Router::new();
    router.insert("GET", "/home", true).unwrap();

    assert_eq!(router.at("PUT", "/home").unwrap_err(), MatchError::NotFound);
}

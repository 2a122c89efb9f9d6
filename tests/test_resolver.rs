use shelf::config::{DotfilesPolicy, StaticFilesConfig};
use shelf::error::ServeError;
use shelf::files::{Resolution, ResolvedFile, Resolver};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

/// Root `<tmp>/static` with a sibling `<tmp>/secret.txt` outside it.
fn fixture() -> (TempDir, StaticFilesConfig) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("static");
    std::fs::create_dir_all(root.join("docs")).unwrap();
    std::fs::write(root.join("hello.txt"), "hi").unwrap();
    std::fs::write(root.join("docs").join("index.html"), "<h1>docs</h1>").unwrap();
    std::fs::write(root.join(".env"), "TOKEN=1").unwrap();
    std::fs::write(root.join("my file.txt"), "spaced").unwrap();
    std::fs::write(tmp.path().join("secret.txt"), "secret").unwrap();

    let cfg = StaticFilesConfig {
        root,
        ..Default::default()
    };
    (tmp, cfg)
}

fn resolve_file(resolver: &Resolver, uri: &str) -> ResolvedFile {
    match resolver.resolve(uri) {
        Ok(Resolution::File(found)) => found,
        other => panic!("expected file for {uri}, got {other:?}"),
    }
}

fn assert_not_found(resolver: &Resolver, uri: &str) {
    match resolver.resolve(uri) {
        Err(ServeError::NotFound) => {}
        other => panic!("expected not found for {uri}, got {other:?}"),
    }
}

fn read_all(mut found: ResolvedFile) -> String {
    let mut body = String::new();
    found.file.read_to_string(&mut body).unwrap();
    body
}

#[test]
fn test_resolves_existing_file() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    let found = resolve_file(&resolver, "/hello.txt");
    assert_eq!(found.len, 2);
    assert_eq!(found.content_type, "text/plain; charset=utf-8");
    assert_eq!(read_all(found), "hi");
}

#[test]
fn test_root_is_absolute() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();
    assert!(resolver.root().is_absolute());
}

#[test]
fn test_missing_root_resolves_nothing() {
    let cfg = StaticFilesConfig {
        root: Path::new("definitely-missing-root-dir").to_path_buf(),
        ..Default::default()
    };
    let resolver = Resolver::new(&cfg).unwrap();

    assert!(resolver.root().is_absolute());
    assert_not_found(&resolver, "/hello.txt");
}

#[test]
fn test_ignores_query_and_fragment() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    assert_eq!(read_all(resolve_file(&resolver, "/hello.txt?v=3#x")), "hi");
}

#[test]
fn test_decodes_percent_escapes() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    assert_eq!(read_all(resolve_file(&resolver, "/my%20file.txt")), "spaced");
}

#[test]
fn test_normalizes_inside_root() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    assert_eq!(read_all(resolve_file(&resolver, "/docs/../hello.txt")), "hi");
    assert_eq!(read_all(resolve_file(&resolver, "//./hello.txt")), "hi");
}

#[test]
fn test_traversal_is_not_found() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    for uri in [
        "/../secret.txt",
        "/docs/../../secret.txt",
        "/%2e%2e/secret.txt",
        "/%2E%2E%2Fsecret.txt",
        "/..%5csecret.txt",
        "/docs/%2e%2e/%2e%2e/secret.txt",
    ] {
        assert_not_found(&resolver, uri);
    }
}

#[test]
fn test_missing_file_is_not_found() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    assert_not_found(&resolver, "/missing.txt");
    assert_not_found(&resolver, "/hello.txt/extra");
    assert_not_found(&resolver, "/hello.txt/");
    assert_not_found(&resolver, "*");
}

#[test]
fn test_directory_without_index_is_not_found() {
    let (_tmp, cfg) = fixture();
    let resolver = Resolver::new(&cfg).unwrap();

    assert_not_found(&resolver, "/docs/");
    assert_not_found(&resolver, "/docs");
    assert_not_found(&resolver, "/");
}

#[test]
fn test_directory_index_when_enabled() {
    let (_tmp, mut cfg) = fixture();
    cfg.index = Some("index.html".to_string());
    let resolver = Resolver::new(&cfg).unwrap();

    let found = resolve_file(&resolver, "/docs/");
    assert_eq!(found.content_type, "text/html; charset=utf-8");
    assert_eq!(read_all(found), "<h1>docs</h1>");

    // root has no index.html
    assert_not_found(&resolver, "/");
}

#[test]
fn test_directory_redirect_when_enabled() {
    let (_tmp, mut cfg) = fixture();
    cfg.index = Some("index.html".to_string());
    cfg.redirect_directories = true;
    let resolver = Resolver::new(&cfg).unwrap();

    match resolver.resolve("/docs?lang=en") {
        Ok(Resolution::Redirect(location)) => assert_eq!(location, "/docs/?lang=en"),
        other => panic!("expected redirect, got {other:?}"),
    }

    match resolver.resolve("//docs") {
        Ok(Resolution::Redirect(location)) => assert_eq!(location, "/docs/"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn test_redirect_location_is_normalized_path() {
    let (_tmp, mut cfg) = fixture();
    std::fs::create_dir_all(cfg.root.join("a~b")).unwrap();
    cfg.redirect_directories = true;
    let resolver = Resolver::new(&cfg).unwrap();

    for (uri, expected) in [
        ("/hello.txt/../docs", "/docs/"),
        ("/./docs", "/docs/"),
        ("/a%7Eb", "/a~b/"),
        ("/a~b", "/a~b/"),
    ] {
        match resolver.resolve(uri) {
            Ok(Resolution::Redirect(location)) => assert_eq!(location, expected, "{uri}"),
            other => panic!("expected redirect for {uri}, got {other:?}"),
        }
    }
}

#[test]
fn test_index_must_be_plain_file_name() {
    let (_tmp, mut cfg) = fixture();
    cfg.index = Some("../secret.txt".to_string());
    assert!(Resolver::new(&cfg).is_err());
}

#[test]
fn test_dotfiles_policy() {
    let (_tmp, mut cfg) = fixture();

    let allow = Resolver::new(&cfg).unwrap();
    assert_eq!(read_all(resolve_file(&allow, "/.env")), "TOKEN=1");

    cfg.dotfiles = DotfilesPolicy::Ignore;
    let ignore = Resolver::new(&cfg).unwrap();
    assert_not_found(&ignore, "/.env");
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_internal_error() {
    use std::os::unix::fs::PermissionsExt;

    let (_tmp, cfg) = fixture();
    let locked = cfg.root.join("locked.txt");
    std::fs::write(&locked, "nope").unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits
    if std::fs::File::open(&locked).is_ok() {
        return;
    }

    let resolver = Resolver::new(&cfg).unwrap();
    match resolver.resolve("/locked.txt") {
        Err(ServeError::Internal(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied)
        }
        other => panic!("expected internal error, got {other:?}"),
    }
}

use repo_corpus_core::contract::{EntryKind, RepositoryEntry};

/// Trimmed `GET /repos/octocat/hello-world/contents/?ref=main` response.
const LISTING: &str = r#"[
  {
    "name": "README.md",
    "path": "README.md",
    "sha": "980a0d5f19a64b4b30a87d4206aade58726b60e3",
    "size": 13,
    "url": "https://api.github.com/repos/octocat/hello-world/contents/README.md?ref=main",
    "html_url": "https://github.com/octocat/hello-world/blob/main/README.md",
    "git_url": "https://api.github.com/repos/octocat/hello-world/git/blobs/980a0d5f19a64b4b30a87d4206aade58726b60e3",
    "download_url": "https://raw.githubusercontent.com/octocat/hello-world/main/README.md",
    "type": "file",
    "_links": {
      "self": "https://api.github.com/repos/octocat/hello-world/contents/README.md?ref=main",
      "git": "https://api.github.com/repos/octocat/hello-world/git/blobs/980a0d5f19a64b4b30a87d4206aade58726b60e3",
      "html": "https://github.com/octocat/hello-world/blob/main/README.md"
    }
  },
  {
    "name": "src",
    "path": "src",
    "sha": "a84d88e7554fc1fa21bcbc4efae3c782a70d2b9d",
    "size": 0,
    "url": "https://api.github.com/repos/octocat/hello-world/contents/src?ref=main",
    "html_url": "https://github.com/octocat/hello-world/tree/main/src",
    "git_url": "https://api.github.com/repos/octocat/hello-world/git/trees/a84d88e7554fc1fa21bcbc4efae3c782a70d2b9d",
    "download_url": null,
    "type": "dir",
    "_links": {
      "self": "https://api.github.com/repos/octocat/hello-world/contents/src?ref=main",
      "git": "https://api.github.com/repos/octocat/hello-world/git/trees/a84d88e7554fc1fa21bcbc4efae3c782a70d2b9d",
      "html": "https://github.com/octocat/hello-world/tree/main/src"
    }
  },
  {
    "name": "latest",
    "path": "latest",
    "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
    "size": 23,
    "url": "https://api.github.com/repos/octocat/hello-world/contents/latest?ref=main",
    "html_url": "https://github.com/octocat/hello-world/blob/main/latest",
    "git_url": "https://api.github.com/repos/octocat/hello-world/git/blobs/3d21ec53a331a6f037a91c368710b99387d012c1",
    "download_url": "https://raw.githubusercontent.com/octocat/hello-world/main/latest",
    "type": "symlink",
    "_links": {
      "self": "https://api.github.com/repos/octocat/hello-world/contents/latest?ref=main",
      "git": "https://api.github.com/repos/octocat/hello-world/git/blobs/3d21ec53a331a6f037a91c368710b99387d012c1",
      "html": "https://github.com/octocat/hello-world/blob/main/latest"
    }
  },
  {
    "name": "vendor-lib",
    "path": "vendor-lib",
    "sha": "fa5a1d22b2b6a2c4c0d7e1f6f1bd1f0c3b1b7f2a",
    "size": 0,
    "url": "https://api.github.com/repos/octocat/hello-world/contents/vendor-lib?ref=main",
    "html_url": "https://github.com/octocat/vendor-lib/tree/fa5a1d22b2b6a2c4c0d7e1f6f1bd1f0c3b1b7f2a",
    "git_url": "https://api.github.com/repos/octocat/vendor-lib/git/trees/fa5a1d22b2b6a2c4c0d7e1f6f1bd1f0c3b1b7f2a",
    "download_url": null,
    "type": "submodule",
    "_links": {
      "self": "https://api.github.com/repos/octocat/hello-world/contents/vendor-lib?ref=main"
    }
  }
]"#;

fn decode() -> Vec<RepositoryEntry> {
    serde_json::from_str(LISTING).expect("contents listing decodes")
}

#[test]
fn test_listing_entry_kinds_map_from_type_field() {
    let kinds: Vec<EntryKind> = decode().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EntryKind::File, EntryKind::Dir, EntryKind::Other, EntryKind::Other]
    );
}

#[test]
fn test_listing_file_entry_fields() {
    let entries = decode();
    let readme = &entries[0];
    assert_eq!(readme.name, "README.md");
    assert_eq!(readme.path, "README.md");
    assert_eq!(
        readme.url,
        "https://api.github.com/repos/octocat/hello-world/contents/README.md?ref=main"
    );
    assert_eq!(
        readme.content_ref(),
        Some("https://raw.githubusercontent.com/octocat/hello-world/main/README.md")
    );
}

#[test]
fn test_listing_null_download_url() {
    let entries = decode();
    let src = &entries[1];
    assert_eq!(src.download_url, None);
    assert_eq!(src.content_ref(), None);
    assert_eq!(
        src.url,
        "https://api.github.com/repos/octocat/hello-world/contents/src?ref=main"
    );
}

#[test]
fn test_only_files_expose_content_reference() {
    let entries = decode();
    // The symlink carries a download_url but is not extracted.
    assert!(entries[2].download_url.is_some());
    assert_eq!(entries[2].content_ref(), None);
}

#[test]
fn test_missing_download_url_field_defaults_to_none() {
    let json = r#"[{"name": "a", "path": "a", "url": "api://a", "type": "dir"}]"#;
    let entries: Vec<RepositoryEntry> = serde_json::from_str(json).unwrap();
    assert_eq!(entries[0].download_url, None);
}

#[test]
fn test_non_array_body_is_rejected() {
    // A single-file response is an object, not a listing.
    let json = r#"{"name": "a", "path": "a", "url": "api://a", "type": "file"}"#;
    assert!(serde_json::from_str::<Vec<RepositoryEntry>>(json).is_err());
}

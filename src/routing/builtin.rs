//! Built-in platform table.
//!
//! Custom entries from the configuration file are merged on top of this table
//! (see [`crate::config::PlatformsConfig::resolved`]).

use crate::config::PlatformConfig;
use crate::routing::RewriteRule;

/// Namespace injected in front of every crates.io API path.
pub const CRATES_API_NAMESPACE: &str = "/api/v1/crates";

/// `(key, origin)` pairs served out of the box.
pub const BUILTIN_PLATFORMS: &[(&str, &str)] = &[
    // Source hosts
    ("gh", "https://github.com"),
    ("gl", "https://gitlab.com"),
    ("gitea", "https://gitea.com"),
    ("codeberg", "https://codeberg.org"),
    ("sf", "https://sourceforge.net"),
    ("hf", "https://huggingface.co"),
    // Language package indexes
    ("npm", "https://registry.npmjs.org"),
    ("pypi", "https://pypi.org"),
    ("pypi-files", "https://files.pythonhosted.org"),
    ("conda", "https://repo.anaconda.com"),
    ("conda-community", "https://conda.anaconda.org"),
    ("maven", "https://repo1.maven.org"),
    ("gradle", "https://plugins.gradle.org"),
    ("rubygems", "https://rubygems.org"),
    ("cran", "https://cran.r-project.org"),
    ("golang", "https://proxy.golang.org"),
    ("nuget", "https://api.nuget.org"),
    ("crates", "https://crates.io"),
    ("packagist", "https://repo.packagist.org"),
    // OS mirrors
    ("debian", "https://deb.debian.org"),
    ("ubuntu", "https://archive.ubuntu.com"),
    ("fedora", "https://dl.fedoraproject.org"),
    ("rocky", "https://download.rockylinux.org"),
    ("opensuse", "https://download.opensuse.org"),
    ("arch", "https://geo.mirror.pkgbuild.com"),
    // Misc artifact hosts
    ("arxiv", "https://arxiv.org"),
    ("fdroid", "https://f-droid.org"),
    // Container registries
    ("cr-quay", "https://quay.io"),
    ("cr-gcr", "https://gcr.io"),
    ("cr-mcr", "https://mcr.microsoft.com"),
    ("cr-ecr", "https://public.ecr.aws"),
    ("cr-ghcr", "https://ghcr.io"),
    ("cr-gitlab", "https://registry.gitlab.com"),
    ("cr-redhat", "https://registry.redhat.io"),
    ("cr-oracle", "https://container-registry.oracle.com"),
    ("cr-cloudsmith", "https://docker.cloudsmith.io"),
    ("cr-digitalocean", "https://registry.digitalocean.com"),
    ("cr-vmware", "https://projects.registry.vmware.com"),
    ("cr-k8s", "https://registry.k8s.io"),
    ("cr-heroku", "https://registry.heroku.com"),
    ("cr-suse", "https://registry.suse.com"),
    ("cr-opensuse", "https://registry.opensuse.org"),
    ("cr-gitpod", "https://registry.gitpod.io"),
];

/// Structural rule for a built-in platform.
pub fn builtin_rule(key: &str) -> RewriteRule {
    match key {
        "crates" => RewriteRule::ApiNamespace {
            namespace: CRATES_API_NAMESPACE.to_string(),
        },
        _ => RewriteRule::Identity,
    }
}

/// The built-in table as platform configs.
pub fn builtin_platforms() -> Vec<PlatformConfig> {
    BUILTIN_PLATFORMS
        .iter()
        .map(|&(key, origin)| PlatformConfig {
            key: key.to_string(),
            origin: origin.to_string(),
            rule: builtin_rule(key),
        })
        .collect()
}

use k8_metadata_client::NameSpace;
use k8_types::{Crd, Spec};

use crate::client::http::Uri;
use crate::ClientError;

/// uri of single item
pub fn item_uri<S>(host: &str, name: &str, namespace: &str) -> Result<Uri, ClientError>
where
    S: Spec,
{
    let ns = if S::NAME_SPACED {
        NameSpace::Named(namespace.to_owned())
    } else {
        NameSpace::All
    };

    let crd = S::metadata();
    let prefix = prefix_uri(crd, host, ns);
    let uri: Uri = format!("{prefix}/{name}").parse()?;
    Ok(uri)
}

/// uri of items in namespace
pub fn items_uri<S>(host: &str, namespace: NameSpace) -> Result<Uri, ClientError>
where
    S: Spec,
{
    let ns = if S::NAME_SPACED {
        namespace
    } else {
        NameSpace::All
    };
    let crd = S::metadata();
    let uri: Uri = prefix_uri(crd, host, ns).parse()?;
    Ok(uri)
}

/// generate prefix for given crd
/// if crd group is core then /api is used otherwise /apis + group
pub fn prefix_uri<N>(crd: &Crd, host: &str, ns: N) -> String
where
    N: Into<NameSpace>,
{
    let namespace = ns.into();
    let version = crd.version;
    let plural = crd.names.plural;
    let group = crd.group;
    let api_prefix = match group {
        "core" => "api".to_owned(),
        _ => format!("apis/{}", group),
    };
    let host = host.trim_end_matches('/');

    if namespace.is_all() {
        format!("{}/{}/{}/{}", host, api_prefix, version, plural)
    } else {
        format!(
            "{}/{}/{}/namespaces/{}/{}",
            host,
            api_prefix,
            version,
            namespace.named(),
            plural
        )
    }
}

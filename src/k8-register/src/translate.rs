use base64::{decode, encode};
use http::Uri;

use k8_config::{Cluster, ClusterDetail, Context, ContextDetail, KubeConfig, User, UserDetail};

use crate::bootstrap::IssuedCredential;
use crate::{ConnectionTarget, RegistrationError};

/// api server of target context, as written in its kubeconfig
pub fn resolve_host(target: &ConnectionTarget) -> Result<String, RegistrationError> {
    let config = KubeConfig::from_file(&target.kubeconfig)?;
    let resolved = config.resolve(&target.context)?;
    let server = resolved.cluster.server.trim();
    validate_endpoint(&target.context, server)?;
    Ok(server.to_owned())
}

/// server must be absolute https uri, the only scheme client can dial
pub fn validate_endpoint(context: &str, server: &str) -> Result<(), RegistrationError> {
    let invalid = |reason: &str| RegistrationError::InvalidEndpoint {
        context: context.to_owned(),
        server: server.to_owned(),
        reason: reason.to_owned(),
    };

    let uri: Uri = server.parse().map_err(|err: http::uri::InvalidUri| invalid(&err.to_string()))?;
    match uri.scheme_str() {
        Some("https") => {}
        Some(_) => return Err(invalid("scheme must be https")),
        None => return Err(invalid("missing scheme")),
    }
    match uri.host() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid("missing host")),
    }
}

/// Build kubeconfig with single cluster, user and context, all named `name`
pub fn to_kubeconfig(
    credential: &IssuedCredential,
    host: &str,
    name: &str,
) -> Result<KubeConfig, RegistrationError> {
    let malformed = |reason: String| RegistrationError::MalformedCredential {
        secret: credential.secret.clone(),
        reason,
    };

    let token = decode(&credential.token).map_err(|err| malformed(format!("token: {err}")))?;
    let token = String::from_utf8(token).map_err(|_| malformed("token is not utf-8".to_owned()))?;
    if token.trim().is_empty() {
        return Err(malformed("empty token".to_owned()));
    }

    let ca = decode(&credential.ca_certificate).map_err(|err| malformed(format!("ca.crt: {err}")))?;
    if ca.is_empty() {
        return Err(malformed("empty ca.crt".to_owned()));
    }

    let mut config = KubeConfig::new();
    config.put_cluster(Cluster {
        name: name.to_owned(),
        cluster: ClusterDetail {
            certificate_authority_data: Some(encode(ca)),
            server: host.to_owned(),
            ..Default::default()
        },
    });
    config.put_user(User {
        name: name.to_owned(),
        user: UserDetail {
            token: Some(token),
            ..Default::default()
        },
    });
    config.put_context(Context {
        name: name.to_owned(),
        context: ContextDetail {
            cluster: name.to_owned(),
            user: name.to_owned(),
            namespace: None,
        },
    });
    config.current_context = name.to_owned();
    Ok(config)
}

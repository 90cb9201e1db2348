use anyhow::Result;
use core_logic::ProxyConfig;
use reqwest::Client;
use std::time::Duration;

pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds a reqwest client with a finite timeout and an optional
/// authenticated proxy. Every outbound client in this crate goes through
/// here so no call site can end up without a timeout.
pub(crate) fn build_client(proxy: Option<&ProxyConfig>) -> Result<Client> {
    let mut builder = Client::builder().timeout(HTTP_TIMEOUT);

    if let Some(proxy_conf) = proxy {
        let mut proxy = reqwest::Proxy::all(&proxy_conf.url)?;
        if let (Some(u), Some(p)) = (&proxy_conf.username, &proxy_conf.password) {
            proxy = proxy.basic_auth(u, p);
        }
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

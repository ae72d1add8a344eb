use crate::proxy::HydraProxy;
use axum::{
    body::Body,
    extract::{Request, State},
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;

/// Relays `/oauth2/*` and `/.well-known/*` to the authorization server's public interface
async fn proxy_handler(State(proxy): State<Arc<HydraProxy>>, request: Request<Body>) -> Response {
    proxy.forward(request).await
}

pub(super) fn router<S>(proxy: Arc<HydraProxy>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/oauth2/{*path}", any(proxy_handler))
        .route("/.well-known/{*path}", any(proxy_handler))
        .with_state(proxy)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestFixture;
    use axum::body::{Body, Bytes};
    use http_body_util::{BodyExt, Full};
    use http::{Method, StatusCode};
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_redirect_into_login_ui_is_rewritten() {
        let fixture = TestFixture::new().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/auth"))
            .and(query_param("client_id", "app"))
            .and(header("x-forwarded-host", "app.example.com"))
            .and(header("x-forwarded-proto", "https"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "https://internal-auth:4444/oauth/login?challenge=abc"),
            )
            .expect(1)
            .mount(&fixture.hydra_public_mock)
            .await;

        let request = fixture
            .request_builder(Method::GET, "/oauth2/auth?client_id=app")
            .header("host", "app.example.com")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        let response = fixture.send(request).await;

        response.assert_status(StatusCode::FOUND);
        response.assert_header("location", "https://app.example.com/oauth/login?challenge=abc");
    }

    #[tokio::test]
    async fn test_other_redirects_pass_through() {
        let fixture = TestFixture::new().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/sessions/logout"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "https://internal-auth:4444/some/other/path"),
            )
            .mount(&fixture.hydra_public_mock)
            .await;

        let request = fixture
            .request_builder(Method::GET, "/oauth2/sessions/logout")
            .header("host", "app.example.com")
            .body(Body::empty())
            .unwrap();
        let response = fixture.send(request).await;

        response.assert_status(StatusCode::FOUND);
        response.assert_header("location", "https://internal-auth:4444/some/other/path");
    }

    #[tokio::test]
    async fn test_well_known_and_multiple_cookies() {
        let fixture = TestFixture::new().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "a=1; Path=/")
                    .append_header("set-cookie", "b=2; Path=/")
                    .set_body_string("{\"issuer\":\"https://app.example.com\"}"),
            )
            .mount(&fixture.hydra_public_mock)
            .await;

        let response = fixture.get("/.well-known/openid-configuration").await;
        response.assert_ok();
        assert_eq!(response.json()["issuer"], "https://app.example.com");
        let cookies: Vec<_> = response
            .headers
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies, vec!["a=1; Path=/", "b=2; Path=/"]);
    }

    #[tokio::test]
    async fn test_request_body_is_forwarded() {
        let fixture = TestFixture::new().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string("grant_type=authorization_code&code=xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"access_token\":\"t\"}"))
            .expect(1)
            .mount(&fixture.hydra_public_mock)
            .await;

        let form = "grant_type=authorization_code&code=xyz";
        let request = fixture
            .request_builder(Method::POST, "/oauth2/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("content-length", form.len().to_string())
            .body(Body::from(form))
            .unwrap();
        let response = fixture.send(request).await;

        response.assert_ok();
        assert_eq!(response.json()["access_token"], "t");
    }

    #[tokio::test]
    async fn test_request_body_without_length_header_is_forwarded() {
        let fixture = TestFixture::new().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string("grant_type=authorization_code&code=xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"access_token\":\"t\"}"))
            .expect(1)
            .mount(&fixture.hydra_public_mock)
            .await;

        // As over HTTP/2: neither content-length nor transfer-encoding
        let form = Full::new(Bytes::from_static(b"grant_type=authorization_code&code=xyz"))
            .map_frame(|frame| frame);
        let request = fixture
            .request_builder(Method::POST, "/oauth2/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::new(form))
            .unwrap();
        assert!(request.headers().get("content-length").is_none());
        let response = fixture.send(request).await;

        response.assert_ok();
        assert_eq!(response.json()["access_token"], "t");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let mut fixture = TestFixture::new().await;
        fixture.config.hydra.public_url = "http://127.0.0.1:1".to_string();
        let fixture = fixture.rebuild().await;

        let response = fixture.get("/oauth2/auth").await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        assert_eq!(response.text(), "bad gateway");
    }

    #[tokio::test]
    async fn test_proxy_routes_absent_when_disabled() {
        let mut fixture = TestFixture::new().await;
        fixture.config.hydra.enabled = false;
        let fixture = fixture.rebuild().await;

        let response = fixture.get("/oauth2/auth").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let response = fixture.get("/api/oauth/login?login_challenge=x").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

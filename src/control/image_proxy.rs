use actix_web::get;
use actix_web::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use actix_web::web::{Bytes, Data, Query};
use actix_web::HttpResponse;
use reqwest::Client;
use serde::Deserialize;

use super::{ControllerError, Response};

pub const NO_URL: &str = "No url provided";
pub const FETCH_FAILED: &str = "Error fetching image";

#[derive(Deserialize, Debug)]
pub struct FetchImageQuery {
    url: Option<String>,
}

/// Relays a remote image so the admin UI can read it without cross-origin
/// restrictions.
#[get("/api/fetchImage")]
pub async fn fetch_image(q: Query<FetchImageQuery>, client: Data<Client>) -> Response {
    let url = q
        .into_inner()
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ControllerError::invalid_input(NO_URL))?;
    let bytes = download(&client, &url)
        .await
        .map_err(|cause| ControllerError::Upstream {
            message: FETCH_FAILED.to_string(),
            cause,
        })?;
    Ok(HttpResponse::Ok()
        .content_type("image/jpeg")
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .body(bytes))
}

async fn download(client: &Client, url: &str) -> Result<Bytes, anyhow::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpServer};

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(Data::new(Client::new()))
                    .service(fetch_image),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn rejects_missing_url() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/fetchImage").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, res.status());
        assert_eq!(Bytes::from_static(NO_URL.as_bytes()), test::read_body(res).await);
    }

    #[actix_web::test]
    async fn reports_unreachable_image() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/fetchImage?url=http%3A%2F%2F127.0.0.1%3A1%2Fmissing.jpg")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
        assert_eq!(
            Bytes::from_static(FETCH_FAILED.as_bytes()),
            test::read_body(res).await
        );
    }

    #[actix_web::test]
    async fn relays_image_bytes() {
        let upstream = HttpServer::new(|| {
            App::new().route(
                "/shoe.jpg",
                web::get().to(|| async { HttpResponse::Ok().body(vec![0xffu8, 0xd8, 0xff]) }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = upstream.addrs()[0];
        actix_web::rt::spawn(upstream.run());

        let app = app!();
        let req = test::TestRequest::get()
            .uri(&format!("/api/fetchImage?url=http://{addr}/shoe.jpg"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(
            "image/jpeg",
            res.headers().get("content-type").unwrap().to_str().unwrap()
        );
        assert_eq!(
            "*",
            res.headers().get("access-control-allow-origin").unwrap().to_str().unwrap()
        );
        assert_eq!(
            Bytes::from_static(&[0xff, 0xd8, 0xff]),
            test::read_body(res).await
        );
    }
}

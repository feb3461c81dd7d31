//! インテグレーションテスト

#[cfg(test)]
mod tests {
    use cookie2json::{
        common::{Method, Request, Response, ResponseWriter},
        deliver, error::Error, Configuration, Cookie2Json,
    };

    fn jsonp_config() -> Configuration {
        Configuration::new()
            .enabled(true)
            .with_callback_name_from("callback")
    }

    fn app_with(config: Configuration) -> Cookie2Json {
        Cookie2Json::builder()
            .scope("^/.*$", config)
            .unwrap()
            .build()
    }

    fn get(path: &str, query: &str, cookie: &str) -> Request {
        Request::new(Method::GET, path)
            .with_query_string(query)
            .with_header("Cookie", cookie)
    }

    fn body_of(res: &Response) -> String {
        String::from_utf8(res.body.clone().unwrap_or_default()).unwrap()
    }

    /// 書き込みに必ず失敗するライター
    struct FailingWriter;

    impl ResponseWriter for FailingWriter {
        fn write_response(&mut self, _response: &Response) -> Result<(), Error> {
            Err(Error::WriteFailure("connection reset".to_string()))
        }
    }

    /// 書き込まれたレスポンスを保持するライター
    #[derive(Default)]
    struct RecordingWriter {
        written: Vec<u16>,
    }

    impl ResponseWriter for RecordingWriter {
        fn write_response(&mut self, response: &Response) -> Result<(), Error> {
            self.written.push(response.status);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_plain_json_response() {
        let app = app_with(Configuration::new().enabled(true));
        let res = app.dispatch(&get("/", "", "a=1; b=2")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.header("Content-Type"), Some("text/javascript"));
        assert_eq!(body_of(&res), r#"{ "a": "1", "b": "2" }"#);
    }

    #[tokio::test]
    async fn test_jsonp_response_with_whitelist() {
        let config = jsonp_config()
            .with_callback_prefix("jsonp_")
            .with_cookie_prefix("pref_");
        let app = app_with(config);
        let res = app
            .dispatch(&get("/data", "callback=jsonp_123", "pref_x=1; other=2; PREF_y=3"))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(
            body_of(&res),
            "jsonp_123({\n  status: 200,\n  body: { \"pref_x\": \"1\", \"PREF_y\": \"3\" }\n});"
        );
    }

    #[tokio::test]
    async fn test_callback_rejections() {
        let app = app_with(jsonp_config().with_callback_prefix("jsonp_"));

        let err = app
            .try_dispatch(&get("/", "callback=alert(1)", "a=1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsafeCallbackCharacter { character: '(', .. }));

        let err = app
            .try_dispatch(&get("/", "callback=evil", "a=1"))
            .await
            .unwrap_err();
        assert_eq!(err, Error::DisallowedCallbackPrefix("evil".to_string()));

        let res = app.dispatch(&get("/", "callback=evil", "secret=1")).await;
        assert_eq!(res.status, 400);
        assert!(!body_of(&res).contains("secret"));
        assert!(!body_of(&res).contains("evil"));
    }

    #[tokio::test]
    async fn test_first_callback_parameter_wins() {
        let app = app_with(jsonp_config());
        let res = app
            .dispatch(&get("/", "x=1&CALLBACK=first&callback=second", "a=1"))
            .await;
        assert!(body_of(&res).starts_with("first({"));
    }

    #[tokio::test]
    async fn test_empty_and_malformed_cookies() {
        let app = app_with(Configuration::new().enabled(true));

        let res = app.dispatch(&Request::new(Method::GET, "/")).await;
        assert_eq!(res.status, 200);
        assert_eq!(body_of(&res), "{  }");

        let res = app.dispatch(&get("/", "", "=orphan; novalue; ; k=v=w")).await;
        assert_eq!(body_of(&res), r#"{ "k": "v=w" }"#);
    }

    #[tokio::test]
    async fn test_declined_requests_become_not_found() {
        let app = app_with(Configuration::new());
        let err = app.try_dispatch(&get("/", "", "a=1")).await.unwrap_err();
        assert!(matches!(err, Error::RouteNotFound(_)));

        let app = app_with(Configuration::new().enabled(true));
        let head = Request::new(Method::HEAD, "/").with_header("Cookie", "a=1");
        assert_eq!(app.dispatch(&head).await.status, 404);

        let sub = get("/", "", "a=1").as_subrequest();
        assert_eq!(app.dispatch(&sub).await.status, 404);
    }

    #[tokio::test]
    async fn test_more_specific_scope_is_preferred() {
        let app = Cookie2Json::builder()
            .scope("^/.*$", Configuration::new().enabled(true))
            .unwrap()
            .scope(
                "^/api/v1/.*$",
                Configuration::new().enabled(true).with_cookie_prefix("api_"),
            )
            .unwrap()
            .build();

        let res = app.dispatch(&get("/api/v1/me", "", "api_id=7; theme=dark")).await;
        assert_eq!(body_of(&res), r#"{ "api_id": "7" }"#);

        let res = app.dispatch(&get("/other", "", "api_id=7; theme=dark")).await;
        assert_eq!(body_of(&res), r#"{ "api_id": "7", "theme": "dark" }"#);
    }

    #[tokio::test]
    async fn test_disabled_nested_scope_hides_cookies() {
        let app = Cookie2Json::builder()
            .scope("^/.*$", Configuration::new().enabled(true))
            .unwrap()
            .scope("^/private/.*$", Configuration::new())
            .unwrap()
            .build();

        let res = app.dispatch(&get("/private/x", "", "secret=1")).await;
        assert_eq!(res.status, 404);
        assert!(!body_of(&res).contains("secret"));

        // 親スコープは引き続き有効
        let res = app.dispatch(&get("/public", "", "a=1")).await;
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn test_nested_scope_declining_head_is_not_retried() {
        let app = Cookie2Json::builder()
            .scope("^/.*$", Configuration::new().enabled(true))
            .unwrap()
            .scope("^/api/.*$", Configuration::new().enabled(true))
            .unwrap()
            .build();

        let head = Request::new(Method::HEAD, "/api/x").with_header("Cookie", "a=1");
        let err = app.try_dispatch(&head).await.unwrap_err();
        assert!(matches!(err, Error::RouteNotFound(_)));
    }

    #[tokio::test]
    async fn test_deliver_reports_write_failure() {
        let app = app_with(Configuration::new().enabled(true));
        let res = app.dispatch(&get("/", "", "a=1")).await;

        assert_eq!(deliver(&res, &mut FailingWriter), 500);

        let mut recorder = RecordingWriter::default();
        assert_eq!(deliver(&res, &mut recorder), 200);
        assert_eq!(recorder.written, vec![200]);
    }

    #[test]
    fn test_directive_configuration_end_to_end() {
        let config = Configuration::from_directives(
            "C2JSON On\nC2JSONCallBackNameFrom cb\nC2JSONCallBackPrefix ok_\nC2JSONPrefix s_\n",
        )
        .unwrap();
        let app = app_with(config);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let res = rt.block_on(app.dispatch(&get("/", "cb=ok_go", "s_a=1; t=2")));
        assert_eq!(
            body_of(&res),
            "ok_go({\n  status: 200,\n  body: { \"s_a\": \"1\" }\n});"
        );
    }
}

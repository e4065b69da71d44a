//! Per-entity accessors for the rentdesk API.
//!
//! Each entity kind is a [`Resource`] bound to its endpoint.

use rentdesk_core::constants::endpoints;
use rentdesk_core::models::{
    Apartment, City, CreateApartmentInput, CreateCityInput, CreateNeighborhoodInput,
    CreateStateInput, CreateUnitInput, Neighborhood, QueryOptions, State, Unit,
};

use crate::{ApiClient, Resource};

pub type StateResource = Resource<State, QueryOptions, CreateStateInput>;
pub type CityResource = Resource<City, QueryOptions, CreateCityInput>;
pub type NeighborhoodResource = Resource<Neighborhood, QueryOptions, CreateNeighborhoodInput>;
pub type ApartmentResource = Resource<Apartment, QueryOptions, CreateApartmentInput>;
pub type UnitResource = Resource<Unit, QueryOptions, CreateUnitInput>;

impl ApiClient {
    pub fn states(&self) -> StateResource {
        Resource::new(endpoints::STATE, self.transport())
    }

    pub fn cities(&self) -> CityResource {
        Resource::new(endpoints::CITY, self.transport())
    }

    pub fn neighborhoods(&self) -> NeighborhoodResource {
        Resource::new(endpoints::NEIGHBORHOOD, self.transport())
    }

    pub fn apartments(&self) -> ApartmentResource {
        Resource::new(endpoints::APARTMENTS, self.transport())
    }

    pub fn units(&self) -> UnitResource {
        Resource::new(endpoints::UNITS, self.transport())
    }

    /// Query options carrying the configured default language.
    pub fn default_query(&self) -> QueryOptions {
        QueryOptions::new(self.config().default_language.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::client_for;
    use mockito::Matcher;
    use rentdesk_core::models::{CreateCityInput, GeoPoint};

    #[tokio::test]
    async fn test_cities_list_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/city")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("language".into(), "en".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"[{"id":"c1","name":"Austin","description":"","location":null,
                    "state":{"id":"s1","name":"Texas"},"media":[]}]"#,
            )
            .create_async()
            .await;

        let (client, _) = client_for(&server, "tok");
        let cities = client
            .cities()
            .all(&client.default_query().page(1))
            .await
            .unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].state.as_ref().unwrap().name, "Texas");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_city_create_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/city/create")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "Austin",
                "stateId": "s1",
                "location": {"type": "Point", "coordinates": [30.2, -97.7]}
            })))
            .with_status(201)
            .with_body(r#"{"id":"c1","name":"Austin","media":["https://cdn.example.com/a.jpg"]}"#)
            .create_async()
            .await;

        let (client, _) = client_for(&server, "tok");
        let input = CreateCityInput {
            name: "Austin".to_string(),
            description: "Capital".to_string(),
            location: GeoPoint::new(30.2, -97.7),
            state_id: "s1".to_string(),
            media: vec!["https://cdn.example.com/a.jpg".to_string()],
        };
        let city = client.cities().create(&input).await.unwrap();
        assert_eq!(city.id, "c1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unit_delete_and_apartment_get_paths() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/units/u1")
            .with_status(200)
            .with_body("true")
            .create_async()
            .await;
        let get = server
            .mock("GET", "/apartments/a1")
            .with_status(200)
            .with_body(r#"{"id":"a1","name":"Maple Court","address":"1 Main St"}"#)
            .create_async()
            .await;

        let (client, _) = client_for(&server, "tok");
        assert!(client.units().delete("u1").await.unwrap());
        let apartment = client.apartments().get("a1").await.unwrap();
        assert_eq!(apartment.address, "1 Main St");
        delete.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn test_neighborhood_update_strips_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/neighborhood/edit/n1")
            .match_body(Matcher::Json(serde_json::json!({"name": "Zilker"})))
            .with_status(200)
            .with_body(r#"{"id":"n1","name":"Zilker"}"#)
            .create_async()
            .await;

        let (client, _) = client_for(&server, "tok");
        let updated = client
            .neighborhoods()
            .patch("n1", &serde_json::json!({"id": "n1", "name": "Zilker"}))
            .await
            .unwrap();
        assert_eq!(updated.name, "Zilker");
        mock.assert_async().await;
    }

    #[test]
    fn test_endpoints() {
        let server_url = "http://localhost:1";
        let store = std::sync::Arc::new(rentdesk_core::MemoryCredentialStore::default());
        let client = crate::ApiClient::new(
            rentdesk_core::ClientConfig::with_base_url(server_url),
            store,
        )
        .unwrap();
        assert_eq!(client.states().endpoint(), "/state");
        assert_eq!(client.cities().endpoint(), "/city");
        assert_eq!(client.neighborhoods().endpoint(), "/neighborhood");
        assert_eq!(client.apartments().endpoint(), "/apartments");
        assert_eq!(client.units().endpoint(), "/units");
    }
}

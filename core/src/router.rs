// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Path router that maps a method and a path to a handler.
//!
//! Routes are registered through a `RouterBuilder`, which compiles every path pattern exactly once
//! when `build` is called.  Patterns are made of `/`-separated segments, each of which is either a
//! literal or a named capture of the form `:name` or `:name(regex)`.  A capture with a regex only
//! accepts segments that match the whole expression; a capture without one accepts any non-empty
//! segment.  Captured values are passed through raw: decoding them is up to the handler.
//!
//! Matching happens in two phases.  First, patterns are tried in registration order and the first
//! one whose structure matches the path is selected, regardless of the request method.  Second,
//! the method is looked up among the handlers registered for that pattern.  If it is missing, the
//! pattern's fallback handler, if any, takes over.  Lower-priority patterns are never consulted
//! once a pattern matched structurally.

use http::Method;
use log::debug;

mod pattern;
use pattern::{Pattern, split_path};

/// Errors detected while building a router.  These are configuration problems.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RouterError {
    /// Indicates that the same method was registered twice for the same pattern.
    #[error("Duplicate handler for {method} {pattern}")]
    DuplicateRoute {
        /// The repeated method.
        method: Method,

        /// The pattern that already had a handler for `method`.
        pattern: String,
    },

    /// Indicates that a fallback was registered twice for the same pattern.
    #[error("Duplicate fallback for {pattern}")]
    DuplicateFallback {
        /// The pattern that already had a fallback.
        pattern: String,
    },

    /// Indicates that a pattern cannot be compiled.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as given at registration time.
        pattern: String,

        /// Explanation of the problem.
        reason: String,
    },
}

/// Result type for this module.
pub type RouterResult<T> = Result<T, RouterError>;

/// Parameters captured from a path, in the order in which they appear in the pattern.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    /// Appends a captured parameter.  Names are unique within a compiled pattern.
    pub(crate) fn push(&mut self, name: String, value: String) {
        self.0.push((name, value));
    }

    /// Returns the raw value captured for the parameter `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Iterates over the captured `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of captured parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no parameters were captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of routing a request.
#[derive(Debug, PartialEq)]
pub enum RouteMatch<'r, H> {
    /// The path and the method matched a registered handler.
    Found {
        /// The handler registered for the pattern and method.
        handler: &'r H,

        /// Parameters captured from the path.
        params: RouteParams,
    },

    /// The path matched a pattern but the method did not, and the pattern has a fallback.
    Fallback {
        /// The fallback handler registered for the pattern.
        handler: &'r H,

        /// Parameters captured from the path.
        params: RouteParams,
    },

    /// The path matched a pattern but the method did not, and the pattern has no fallback.
    MethodNotAllowed,

    /// No pattern matched the path.
    NotFound,
}

/// Which methods a registration applies to.
enum Methods {
    /// Exactly one method.
    Only(Method),

    /// Any method without an explicit registration for the same pattern.
    NoneOfTheRegistered,
}

/// A pending registration in a `RouterBuilder`.
struct Registration<H> {
    /// Textual pattern to compile.
    pattern: String,

    /// Methods handled by `handler`.
    methods: Methods,

    /// The handler to invoke.
    handler: H,
}

/// Builder for a `Router`.
///
/// Registration order defines the priority of the patterns: the position of a pattern is given
/// by the first registration that mentions its text.
#[must_use]
pub struct RouterBuilder<H> {
    /// Registrations in the order in which they were added.
    registrations: Vec<Registration<H>>,
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self { registrations: vec![] }
    }
}

impl<H> RouterBuilder<H> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for requests with `method` whose path matches `pattern`.
    pub fn on<P: Into<String>>(mut self, method: Method, pattern: P, handler: H) -> Self {
        self.registrations.push(Registration {
            pattern: pattern.into(),
            methods: Methods::Only(method),
            handler,
        });
        self
    }

    /// Registers `handler` for `GET` requests whose path matches `pattern`.
    pub fn get<P: Into<String>>(self, pattern: P, handler: H) -> Self {
        self.on(Method::GET, pattern, handler)
    }

    /// Registers `handler` for `POST` requests whose path matches `pattern`.
    pub fn post<P: Into<String>>(self, pattern: P, handler: H) -> Self {
        self.on(Method::POST, pattern, handler)
    }

    /// Registers `handler` for `PUT` requests whose path matches `pattern`.
    pub fn put<P: Into<String>>(self, pattern: P, handler: H) -> Self {
        self.on(Method::PUT, pattern, handler)
    }

    /// Registers `handler` for `DELETE` requests whose path matches `pattern`.
    pub fn delete<P: Into<String>>(self, pattern: P, handler: H) -> Self {
        self.on(Method::DELETE, pattern, handler)
    }

    /// Registers `handler` for requests whose path matches `pattern` but whose method has no
    /// handler of its own for that same pattern.
    pub fn fallback<P: Into<String>>(mut self, pattern: P, handler: H) -> Self {
        self.registrations.push(Registration {
            pattern: pattern.into(),
            methods: Methods::NoneOfTheRegistered,
            handler,
        });
        self
    }

    /// Compiles all registered patterns and validates the route table.
    pub fn build(self) -> RouterResult<Router<H>> {
        let mut routes: Vec<Route<H>> = vec![];
        for registration in self.registrations {
            let index = match routes.iter().position(|r| r.pattern.as_str() == registration.pattern)
            {
                Some(index) => index,
                None => {
                    let pattern = Pattern::compile(&registration.pattern)?;
                    routes.push(Route { pattern, handlers: vec![], fallback: None });
                    routes.len() - 1
                }
            };
            let route = &mut routes[index];

            match registration.methods {
                Methods::Only(method) => {
                    if route.handlers.iter().any(|(m, _)| *m == method) {
                        return Err(RouterError::DuplicateRoute {
                            method,
                            pattern: registration.pattern,
                        });
                    }
                    debug!("Registered route {} {}", method, registration.pattern);
                    route.handlers.push((method, registration.handler));
                }
                Methods::NoneOfTheRegistered => {
                    if route.fallback.is_some() {
                        return Err(RouterError::DuplicateFallback {
                            pattern: registration.pattern,
                        });
                    }
                    debug!("Registered fallback for {}", registration.pattern);
                    route.fallback = Some(registration.handler);
                }
            }
        }
        Ok(Router { routes })
    }
}

/// All handlers registered for a single pattern.
struct Route<H> {
    /// The compiled pattern.
    pattern: Pattern,

    /// Handlers keyed by method, in registration order.
    handlers: Vec<(Method, H)>,

    /// Handler for any method not in `handlers`.
    fallback: Option<H>,
}

/// Immutable route table.
pub struct Router<H> {
    /// Routes in priority order.
    routes: Vec<Route<H>>,
}

impl<H> Router<H> {
    /// Creates a builder for a new router.
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    /// Finds the handler for a request with `method` to `path`.
    ///
    /// `path` must not include the query string.
    pub fn route(&self, method: &Method, path: &str) -> RouteMatch<'_, H> {
        let Some(segments) = split_path(path) else {
            return RouteMatch::NotFound;
        };

        for route in &self.routes {
            let Some(params) = route.pattern.matches(&segments) else {
                continue;
            };

            if let Some((_, handler)) = route.handlers.iter().find(|(m, _)| m == method) {
                return RouteMatch::Found { handler, params };
            }
            return match route.fallback.as_ref() {
                Some(handler) => RouteMatch::Fallback { handler, params },
                None => RouteMatch::MethodNotAllowed,
            };
        }
        RouteMatch::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a router with the same shape as the book service's.
    fn books_router() -> Router<&'static str> {
        Router::builder()
            .get("/", "list")
            .post("/", "create")
            .fallback("/", "root-not-allowed")
            .get("/author/:author", "by-author")
            .fallback("/author/:author", "author-not-allowed")
            .get("/:booknum([0-9]+)", "get")
            .put("/:booknum([0-9]+)", "update")
            .delete("/:booknum([0-9]+)", "delete")
            .fallback("/:booknum([0-9]+)", "booknum-not-allowed")
            .build()
            .unwrap()
    }

    /// Creates a `RouteParams` from a list of pairs.
    fn params(pairs: &[(&str, &str)]) -> RouteParams {
        let mut params = RouteParams::default();
        for (k, v) in pairs {
            params.push((*k).to_owned(), (*v).to_owned());
        }
        params
    }

    #[test]
    fn test_route_params_accessors() {
        let params = params(&[("a", "1"), ("b", "2")]);
        assert_eq!(2, params.len());
        assert!(!params.is_empty());
        assert_eq!(Some("1"), params.get("a"));
        assert_eq!(Some("2"), params.get("b"));
        assert_eq!(None, params.get("c"));
        assert_eq!(vec![("a", "1"), ("b", "2")], params.iter().collect::<Vec<_>>());
        assert!(RouteParams::default().is_empty());
    }

    #[test]
    fn test_found() {
        let router = books_router();
        for (method, path, exp_handler, exp_params) in [
            (Method::GET, "/", "list", params(&[])),
            (Method::POST, "/", "create", params(&[])),
            (
                Method::GET,
                "/author/Agatha%20Christie",
                "by-author",
                params(&[("author", "Agatha%20Christie")]),
            ),
            (Method::GET, "/2", "get", params(&[("booknum", "2")])),
            (Method::PUT, "/15", "update", params(&[("booknum", "15")])),
            (Method::DELETE, "/0", "delete", params(&[("booknum", "0")])),
        ] {
            assert_eq!(
                RouteMatch::Found { handler: &exp_handler, params: exp_params },
                router.route(&method, path),
                "Bad match for {} {}",
                method,
                path
            );
        }
    }

    #[test]
    fn test_fallback() {
        let router = books_router();
        for (method, path, exp_handler, exp_params) in [
            (Method::PUT, "/", "root-not-allowed", params(&[])),
            (Method::DELETE, "/", "root-not-allowed", params(&[])),
            (Method::POST, "/author/x", "author-not-allowed", params(&[("author", "x")])),
            (Method::POST, "/3", "booknum-not-allowed", params(&[("booknum", "3")])),
            (Method::PATCH, "/3", "booknum-not-allowed", params(&[("booknum", "3")])),
            (Method::HEAD, "/3", "booknum-not-allowed", params(&[("booknum", "3")])),
        ] {
            assert_eq!(
                RouteMatch::Fallback { handler: &exp_handler, params: exp_params },
                router.route(&method, path),
                "Bad match for {} {}",
                method,
                path
            );
        }
    }

    #[test]
    fn test_not_found() {
        let router = books_router();
        for path in ["/abc", "/1/2", "/author", "/author/", "/author/a/b", "/1/", "//", "", "x"] {
            assert_eq!(RouteMatch::NotFound, router.route(&Method::GET, path), "Path {}", path);
        }
    }

    #[test]
    fn test_non_ascii_digits_do_not_match_booknum() {
        let router = books_router();
        for path in ["/\u{0663}", "/\u{FF13}", "/1\u{0663}"] {
            for method in [Method::GET, Method::PATCH] {
                assert_eq!(
                    RouteMatch::NotFound,
                    router.route(&method, path),
                    "Bad match for {} {}",
                    method,
                    path
                );
            }
        }
    }

    #[test]
    fn test_method_not_allowed_without_fallback() {
        let router = Router::builder().get("/", "list").build().unwrap();
        assert_eq!(RouteMatch::MethodNotAllowed, router.route(&Method::POST, "/"));
    }

    #[test]
    fn test_first_structural_match_wins() {
        let router = Router::builder()
            .get("/:name", "by-name")
            .delete(r"/:num(\d+)", "delete")
            .build()
            .unwrap();
        assert_eq!(
            RouteMatch::Found { handler: &"by-name", params: params(&[("name", "5")]) },
            router.route(&Method::GET, "/5")
        );
        assert_eq!(RouteMatch::MethodNotAllowed, router.route(&Method::DELETE, "/5"));
    }

    #[test]
    fn test_priority_follows_first_registration_of_pattern() {
        let router = Router::builder()
            .get("/author/:author", "first")
            .get("/:a/:b", "second")
            .put("/author/:author", "first-put")
            .build()
            .unwrap();
        assert_eq!(
            RouteMatch::Found { handler: &"first-put", params: params(&[("author", "x")]) },
            router.route(&Method::PUT, "/author/x")
        );
        assert_eq!(
            RouteMatch::Found { handler: &"second", params: params(&[("a", "b"), ("b", "x")]) },
            router.route(&Method::GET, "/b/x")
        );
    }

    #[test]
    fn test_fallback_registered_before_methods() {
        let router = Router::builder()
            .fallback("/", "not-allowed")
            .get("/", "list")
            .build()
            .unwrap();
        assert_eq!(
            RouteMatch::Found { handler: &"list", params: params(&[]) },
            router.route(&Method::GET, "/")
        );
        assert_eq!(
            RouteMatch::Fallback { handler: &"not-allowed", params: params(&[]) },
            router.route(&Method::POST, "/")
        );
    }

    #[test]
    fn test_duplicate_route() {
        let err = Router::builder()
            .get(r"/:booknum(\d+)", "a")
            .put(r"/:booknum(\d+)", "b")
            .get(r"/:booknum(\d+)", "c")
            .build()
            .err()
            .unwrap();
        assert_eq!(
            RouterError::DuplicateRoute {
                method: Method::GET,
                pattern: r"/:booknum(\d+)".to_owned()
            },
            err
        );
        assert_eq!(r"Duplicate handler for GET /:booknum(\d+)", err.to_string());
    }

    #[test]
    fn test_same_method_on_different_patterns_is_fine() {
        Router::builder().get("/:a", "a").get(r"/:a(\d+)", "b").build().unwrap();
    }

    #[test]
    fn test_duplicate_fallback() {
        let err =
            Router::builder().fallback("/", "a").fallback("/", "b").build().err().unwrap();
        assert_eq!(RouterError::DuplicateFallback { pattern: "/".to_owned() }, err);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Router::builder().get("/ok", "a").get("no-slash", "b").build().err().unwrap();
        assert_eq!(
            RouterError::InvalidPattern {
                pattern: "no-slash".to_owned(),
                reason: "Patterns must start with a slash".to_owned(),
            },
            err
        );
    }
}
